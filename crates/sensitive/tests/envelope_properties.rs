//! Round-trip, tamper, and isolation properties of the two suites, exercised
//! through the public API only.

use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use proptest::prelude::*;
use sensitive::{
    crypto::{GmStrategy, ModernStrategy},
    AlgorithmMode, EncryptionResult, EncryptionStrategy, EnvelopeError, EnvelopeService, FixedMode,
    GeneratedKeySupply, KeyManager, KeySupply,
};

fn service(mode: AlgorithmMode, keys: Arc<dyn KeySupply>) -> EnvelopeService {
    EnvelopeService::new(Arc::new(FixedMode(mode)), keys)
}

/// Flip one bit of byte `index` in wire field `field` (3 = ciphertext, 4 = tag).
fn flip_byte(wire: &str, field: usize, index: usize) -> String {
    let mut fields: Vec<String> = wire.split('|').map(str::to_owned).collect();
    let mut bytes = URL_SAFE_NO_PAD.decode(&fields[field]).unwrap();
    let i = index % bytes.len();
    bytes[i] ^= 0x01;
    fields[field] = URL_SAFE_NO_PAD.encode(&bytes);
    fields.join("|")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn round_trip_every_mode(plaintext in any::<String>()) {
        let keys: Arc<dyn KeySupply> = Arc::new(GeneratedKeySupply::new());
        for mode in AlgorithmMode::ALL {
            let service = service(mode, Arc::clone(&keys));
            let wire = service.encrypt(&plaintext).unwrap();
            let prefix = format!("_mask|{}|", mode.code());
            prop_assert!(wire.starts_with(&prefix));
            prop_assert_eq!(service.decrypt(&wire).unwrap(), plaintext.clone());
        }
    }

    #[test]
    fn any_flipped_byte_fails_integrity(
        plaintext in "\\PC{1,64}",
        field in 3usize..=4,
        index in any::<usize>(),
    ) {
        let keys: Arc<dyn KeySupply> = Arc::new(GeneratedKeySupply::new());
        for mode in AlgorithmMode::ALL {
            let service = service(mode, Arc::clone(&keys));
            let wire = service.encrypt(&plaintext).unwrap();
            let tampered = flip_byte(&wire, field, index);
            let outcome = service.decrypt(&tampered);
            prop_assert!(
                matches!(outcome, Err(EnvelopeError::IntegrityViolation(m)) if m == mode),
                "{mode}: expected integrity violation, got {outcome:?}"
            );
        }
    }
}

#[test]
fn encryption_is_not_deterministic() {
    let service = service(AlgorithmMode::Gm, Arc::new(GeneratedKeySupply::new()));
    let a = EncryptionResult::parse(&service.encrypt("same").unwrap()).unwrap();
    let b = EncryptionResult::parse(&service.encrypt("same").unwrap()).unwrap();
    assert_ne!(a.nonce(), b.nonce());
    assert_ne!(a.ciphertext(), b.ciphertext());
}

#[test]
fn suites_do_not_accept_each_other() {
    let keys = KeyManager::new();
    let gm = GmStrategy
        .encrypt("x", &keys.pair_for(AlgorithmMode::Gm))
        .unwrap();
    let modern = ModernStrategy
        .encrypt("x", &keys.pair_for(AlgorithmMode::Modern))
        .unwrap();

    assert!(!ModernStrategy.supports(&gm.to_wire()));
    assert!(!GmStrategy.supports(&modern.to_wire()));
    assert!(ModernStrategy
        .decrypt(&gm, &keys.pair_for(AlgorithmMode::Modern))
        .is_err());
    assert!(GmStrategy
        .decrypt(&modern, &keys.pair_for(AlgorithmMode::Gm))
        .is_err());
}

#[test]
fn mixed_batch_decrypts_without_a_mode() {
    let keys: Arc<dyn KeySupply> = Arc::new(GeneratedKeySupply::new());
    let gm = service(AlgorithmMode::Gm, Arc::clone(&keys));
    let modern = service(AlgorithmMode::Modern, Arc::clone(&keys));

    let plaintexts = ["6222020200112233445", "张三", "", "a@b.cn", "13800138000"];
    let batch: Vec<String> = plaintexts
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let suite = if i % 2 == 0 { &gm } else { &modern };
            suite.encrypt(p).unwrap()
        })
        .collect();

    for (wire, expected) in batch.iter().zip(plaintexts) {
        assert_eq!(gm.decrypt(wire).unwrap(), expected);
        assert_eq!(modern.decrypt(wire).unwrap(), expected);
    }
}

#[test]
fn modern_scenario_with_fresh_keys() {
    let plaintext = "110101199001011234@ggg.com";
    let owner = service(AlgorithmMode::Modern, Arc::new(GeneratedKeySupply::new()));
    let wire = owner.encrypt(plaintext).unwrap();
    assert!(wire.starts_with("_mask|MODERN|"));
    assert_eq!(owner.decrypt(&wire).unwrap(), plaintext);

    let stranger = service(AlgorithmMode::Modern, Arc::new(GeneratedKeySupply::new()));
    assert!(matches!(
        stranger.decrypt(&wire),
        Err(EnvelopeError::IntegrityViolation(AlgorithmMode::Modern))
    ));
}

#[test]
fn mode_codes() {
    assert_eq!(AlgorithmMode::from_code("GM").unwrap(), AlgorithmMode::Gm);
    assert!(matches!(
        AlgorithmMode::from_code("XX"),
        Err(EnvelopeError::UnknownAlgorithm(code)) if code == "XX"
    ));
}

#[test]
fn malformed_input() {
    let service = service(AlgorithmMode::Modern, Arc::new(GeneratedKeySupply::new()));
    for wire in ["not-an-envelope", "_mask|GM|abc"] {
        assert!(matches!(
            service.decrypt(wire),
            Err(EnvelopeError::MalformedEnvelope(_))
        ));
    }
}
