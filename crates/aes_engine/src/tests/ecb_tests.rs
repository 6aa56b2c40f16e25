// Copyright (C) Microsoft Corporation. All rights reserved.

use super::*;

const ECB_CIPHERTEXT: &str = concat!(
    "3ad77bb40d7a3660a89ecaf32466ef97",
    "f5d3d58503b9699de785895a96fdbaaf",
    "43b1cd7f598ece23881b00e3ed030688",
    "7b0c785e27e8ad3f8223207104725dd4",
);

#[test]
fn test_ecb_sp800_38a_encrypt_decrypt() {
    init_tracing();
    let key = key_from_hex(NIST_KEY);
    let plaintext = unhex(NIST_PLAINTEXT);
    let algo = AesModeAlgo::new(AesMechanism::Ecb);

    let ciphertext = Encrypter::encrypt_vec(&algo, &key, &plaintext).expect("Failed to encrypt");
    assert_eq!(hex::encode(&ciphertext), ECB_CIPHERTEXT);

    let decrypted = Decrypter::decrypt_vec(&algo, &key, &ciphertext).expect("Failed to decrypt");
    assert_eq!(decrypted, plaintext);
}

#[test]
fn test_ecb_matches_openssl_all_key_sizes() {
    init_tracing();
    for bits in [128, 192, 256] {
        let key_bytes = pattern(bits / 8, 7);
        let key = AesKey::from_bytes(&key_bytes);
        let plaintext = pattern(80, 3);
        let algo = AesModeAlgo::new(AesMechanism::Ecb);

        let ciphertext =
            Encrypter::encrypt_vec(&algo, &key, &plaintext).expect("Failed to encrypt");
        let expected = ossl_crypt(
            ossl_cipher(AesMode::Ecb, bits),
            Mode::Encrypt,
            &key_bytes,
            None,
            &plaintext,
        );
        assert_eq!(ciphertext, expected, "AES-{bits} ECB mismatch");
    }
}

#[test]
fn test_ecb_unaligned_input_rejected() {
    init_tracing();
    let key = key_from_hex(NIST_KEY);
    let algo = AesModeAlgo::new(AesMechanism::Ecb);

    assert_eq!(
        Encrypter::encrypt(&algo, &key, &[0u8; 17], None),
        Err(AesEngineError::DataLenRange)
    );
    assert_eq!(
        Decrypter::decrypt(&algo, &key, &[0u8; 15], None),
        Err(AesEngineError::EncryptedDataLenRange)
    );
}

#[test]
fn test_ecb_empty_input() {
    init_tracing();
    let key = key_from_hex(NIST_KEY);
    let algo = AesModeAlgo::new(AesMechanism::Ecb);

    let ciphertext = Encrypter::encrypt_vec(&algo, &key, &[]).expect("Failed to encrypt");
    assert!(ciphertext.is_empty());
}

#[test]
fn test_ecb_in_place_matches_out_of_place() {
    init_tracing();
    let key = key_from_hex(NIST_KEY);
    let plaintext = unhex(NIST_PLAINTEXT);
    let algo = AesModeAlgo::new(AesMechanism::Ecb);

    let mut buffer = plaintext.clone();
    let len = buffer.len();
    let written = algo
        .encrypt_in_place(&key, &mut CryptoDataMut::raw(&mut buffer), len)
        .expect("Failed to encrypt in place");
    assert_eq!(written, len);
    assert_eq!(hex::encode(&buffer), ECB_CIPHERTEXT);

    let written = algo
        .decrypt_in_place(&key, &mut CryptoDataMut::raw(&mut buffer), len)
        .expect("Failed to decrypt in place");
    assert_eq!(written, len);
    assert_eq!(buffer, plaintext);

    // streaming, with updates that split blocks
    let mut ctx = Encrypter::encrypt_init(algo, &key).expect("Failed to init encryption");
    let mut ciphertext = Vec::new();
    for piece in plaintext.chunks(20) {
        let mut chunk = piece.to_vec();
        chunk.resize(piece.len() + AES_BLOCK_LEN, 0);
        let written = ctx
            .update_in_place(&mut CryptoDataMut::raw(&mut chunk), piece.len())
            .expect("Failed to update in place");
        ciphertext.extend_from_slice(&chunk[..written]);
    }
    assert_eq!(ctx.finish_vec().expect("Failed to finish"), Vec::<u8>::new());
    assert_eq!(hex::encode(&ciphertext), ECB_CIPHERTEXT);
}
