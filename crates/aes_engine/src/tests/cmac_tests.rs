// Copyright (C) Microsoft Corporation. All rights reserved.

use openssl::pkey::PKey;

use super::*;

/// RFC 4493 examples: message length and expected MAC.
const CMAC_VECTORS: [(usize, &str); 4] = [
    (0, "bb1d6929e95937287fa37d129b756746"),
    (16, "070a16b46b4d4144f79bdd9dd04a287c"),
    (40, "dfa66747de9ae63030ca32611497c827"),
    (64, "51f0bebf7e3b9d92fc49741779363cfe"),
];

fn ossl_cmac(bits: usize, key: &[u8], message: &[u8]) -> Vec<u8> {
    let pkey = PKey::cmac(&ossl_cipher(AesMode::Cbc, bits), key).expect("Failed to create CMAC key");
    let mut signer =
        openssl::sign::Signer::new_without_digest(&pkey).expect("Failed to create CMAC signer");
    signer.update(message).expect("OpenSSL CMAC update failed");
    signer.sign_to_vec().expect("OpenSSL CMAC failed")
}

#[test]
fn test_cmac_rfc4493_vectors() {
    init_tracing();
    let key = key_from_hex(NIST_KEY);
    let message = unhex(NIST_PLAINTEXT);
    let algo = AesModeAlgo::new(AesMechanism::Cmac);

    for (len, expected) in CMAC_VECTORS {
        let mac = Signer::sign_vec(&algo, &key, &message[..len]).expect("Failed to sign");
        assert_eq!(hex::encode(&mac), expected, "message length {len}");

        Verifier::verify(&algo, &key, &message[..len], &mac).expect("Failed to verify");
    }
}

#[test]
fn test_cmac_streaming_every_chunk_size() {
    init_tracing();
    let key = key_from_hex(NIST_KEY);
    let message = unhex(NIST_PLAINTEXT);

    for (len, expected) in CMAC_VECTORS {
        for chunk in 1..=len.max(1) {
            let mut ctx = Signer::sign_init(AesModeAlgo::new(AesMechanism::Cmac), &key)
                .expect("Failed to init MAC");
            for piece in message[..len].chunks(chunk) {
                ctx.update(&CryptoData::raw(piece)).expect("Failed to update");
            }
            assert_eq!(ctx.finish(None), Ok(16));
            let mac = ctx.finish_vec().expect("Failed to finish");
            assert_eq!(hex::encode(&mac), expected, "length {len}, chunk {chunk}");
            assert!(!ctx.is_active());
        }
    }
}

#[test]
fn test_cmac_encrypt_atomic_emits_one_block() {
    init_tracing();
    let key = key_from_hex(NIST_KEY);
    let message = unhex(NIST_PLAINTEXT);

    let required = encrypt_atomic(&AesMechanism::Cmac, &key, None, &CryptoData::raw(&message), None)
        .expect("Failed to size CMAC");
    assert_eq!(required, 16);

    let mut mac = [0u8; 16];
    let written = encrypt_atomic(
        &AesMechanism::Cmac,
        &key,
        None,
        &CryptoData::raw(&message),
        Some(&mut CryptoDataMut::raw(&mut mac)),
    )
    .expect("Failed to compute CMAC");
    assert_eq!(written, 16);
    assert_eq!(hex::encode(mac), CMAC_VECTORS[3].1);
}

#[test]
fn test_cmac_verify_rejects_tampering() {
    init_tracing();
    let key = key_from_hex(NIST_KEY);
    let message = unhex(NIST_PLAINTEXT);
    let algo = AesModeAlgo::new(AesMechanism::Cmac);
    let mac = unhex(CMAC_VECTORS[3].1);

    let mut bad_mac = mac.clone();
    bad_mac[15] ^= 0x01;
    assert_eq!(
        Verifier::verify(&algo, &key, &message, &bad_mac),
        Err(AesEngineError::InvalidMac)
    );

    let mut bad_message = message.clone();
    bad_message[0] ^= 0x80;
    assert_eq!(
        Verifier::verify(&algo, &key, &bad_message, &mac),
        Err(AesEngineError::InvalidMac)
    );

    assert_eq!(
        Verifier::verify(&algo, &key, &message, &mac[..8]),
        Err(AesEngineError::InvalidMac)
    );
}

#[test]
fn test_cmac_cannot_decrypt() {
    init_tracing();
    let key = key_from_hex(NIST_KEY);
    let algo = AesModeAlgo::new(AesMechanism::Cmac);

    assert_eq!(
        Decrypter::decrypt(&algo, &key, &[0u8; 16], None),
        Err(AesEngineError::MechanismInvalid)
    );
    assert!(matches!(
        Decrypter::decrypt_init(algo, &key),
        Err(AesEngineError::MechanismInvalid)
    ));
}

#[test]
fn test_mac_rejects_cipher_mechanisms() {
    init_tracing();
    let key = key_from_hex(NIST_KEY);
    let mechanisms = [
        AesMechanism::Ecb,
        AesMechanism::Cbc { iv: vec![0u8; 16] },
        AesMechanism::Gcm(GcmParams {
            iv: vec![0u8; 12],
            aad: Vec::new(),
            tag_bits: 128,
        }),
    ];

    for mechanism in mechanisms {
        let algo = AesModeAlgo::new(mechanism);
        assert_eq!(
            Signer::sign(&algo, &key, &[0u8; 16], None),
            Err(AesEngineError::MechanismInvalid)
        );
        assert_eq!(
            Verifier::verify(&algo, &key, &[0u8; 16], &[0u8; 16]),
            Err(AesEngineError::MechanismInvalid)
        );
        assert!(matches!(
            Signer::sign_init(algo, &key),
            Err(AesEngineError::MechanismInvalid)
        ));
    }
}

#[test]
fn test_cmac_matches_openssl_all_key_sizes() {
    init_tracing();
    for bits in [128, 192, 256] {
        let key_bytes = pattern(bits / 8, 4);
        let key = AesKey::from_bytes(&key_bytes);
        let algo = AesModeAlgo::new(AesMechanism::Cmac);

        for len in [0, 1, 16, 32, 45] {
            let message = pattern(len, 5);
            let mac = Signer::sign_vec(&algo, &key, &message).expect("Failed to sign");
            assert_eq!(
                mac,
                ossl_cmac(bits, &key_bytes, &message),
                "AES-{bits} CMAC, length {len}"
            );
            Verifier::verify(&algo, &key, &message, &mac).expect("Failed to verify");
        }
    }
}

#[test]
fn test_cmac_in_place_matches_out_of_place() {
    init_tracing();
    let key = key_from_hex(NIST_KEY);
    let message = unhex(NIST_PLAINTEXT);
    let algo = AesModeAlgo::new(AesMechanism::Cmac);

    for (len, expected) in CMAC_VECTORS {
        let mut buffer = message[..len].to_vec();
        buffer.resize(len.max(AES_BLOCK_LEN), 0);
        let written = algo
            .encrypt_in_place(&key, &mut CryptoDataMut::raw(&mut buffer), len)
            .expect("Failed to compute CMAC in place");
        assert_eq!(written, AES_BLOCK_LEN);
        assert_eq!(hex::encode(&buffer[..written]), expected, "message length {len}");
    }
}
