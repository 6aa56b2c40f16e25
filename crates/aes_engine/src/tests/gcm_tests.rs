// Copyright (C) Microsoft Corporation. All rights reserved.

use super::*;

/// Test cases 1 to 4 from the GCM submission to NIST.
struct GcmVector {
    key: &'static str,
    iv: &'static str,
    aad: &'static str,
    plaintext: &'static str,
    ciphertext: &'static str,
    tag: &'static str,
}

const GCM_VECTORS: [GcmVector; 4] = [
    GcmVector {
        key: "00000000000000000000000000000000",
        iv: "000000000000000000000000",
        aad: "",
        plaintext: "",
        ciphertext: "",
        tag: "58e2fccefa7e3061367f1d57a4e7455a",
    },
    GcmVector {
        key: "00000000000000000000000000000000",
        iv: "000000000000000000000000",
        aad: "",
        plaintext: "00000000000000000000000000000000",
        ciphertext: "0388dace60b6a392f328c2b971b2fe78",
        tag: "ab6e47d42cec13bdf53a67b21257bddf",
    },
    GcmVector {
        key: "feffe9928665731c6d6a8f9467308308",
        iv: "cafebabefacedbaddecaf888",
        aad: "",
        plaintext: concat!(
            "d9313225f88406e5a55909c5aff5269a",
            "86a7a9531534f7da2e4c303d8a318a72",
            "1c3c0c95956809532fcf0e2449a6b525",
            "b16aedf5aa0de657ba637b391aafd255",
        ),
        ciphertext: concat!(
            "42831ec2217774244b7221b784d0d49c",
            "e3aa212f2c02a4e035c17e2329aca12e",
            "21d514b25466931c7d8f6a5aac84aa05",
            "1ba30b396a0aac973d58e091473f5985",
        ),
        tag: "4d5c2af327cd64a62cf35abd2ba6fab4",
    },
    GcmVector {
        key: "feffe9928665731c6d6a8f9467308308",
        iv: "cafebabefacedbaddecaf888",
        aad: "feedfacedeadbeeffeedfacedeadbeefabaddad2",
        plaintext: concat!(
            "d9313225f88406e5a55909c5aff5269a",
            "86a7a9531534f7da2e4c303d8a318a72",
            "1c3c0c95956809532fcf0e2449a6b525",
            "b16aedf5aa0de657ba637b39",
        ),
        ciphertext: concat!(
            "42831ec2217774244b7221b784d0d49c",
            "e3aa212f2c02a4e035c17e2329aca12e",
            "21d514b25466931c7d8f6a5aac84aa05",
            "1ba30b396a0aac973d58e091",
        ),
        tag: "5bc94fbc3221a5db94fae95ae7121a47",
    },
];

fn gcm(iv: &[u8], aad: &[u8], tag_bits: usize) -> AesMechanism {
    AesMechanism::Gcm(GcmParams {
        iv: iv.to_vec(),
        aad: aad.to_vec(),
        tag_bits,
    })
}

#[test]
fn test_gcm_known_answer_vectors() {
    init_tracing();
    for (index, vector) in GCM_VECTORS.iter().enumerate() {
        let key = key_from_hex(vector.key);
        let algo = AesModeAlgo::new(gcm(&unhex(vector.iv), &unhex(vector.aad), 128));
        let plaintext = unhex(vector.plaintext);

        let output = Encrypter::encrypt_vec(&algo, &key, &plaintext).expect("Failed to encrypt");
        let (ciphertext, tag) = output.split_at(plaintext.len());
        assert_eq!(hex::encode(ciphertext), vector.ciphertext, "case {}", index + 1);
        assert_eq!(hex::encode(tag), vector.tag, "case {}", index + 1);

        let decrypted = Decrypter::decrypt_vec(&algo, &key, &output).expect("Failed to decrypt");
        assert_eq!(decrypted, plaintext, "case {}", index + 1);
    }
}

#[test]
fn test_gcm_streaming_every_chunk_size() {
    init_tracing();
    let vector = &GCM_VECTORS[3];
    let key = key_from_hex(vector.key);
    let mechanism = gcm(&unhex(vector.iv), &unhex(vector.aad), 128);
    let plaintext = unhex(vector.plaintext);
    let expected = format!("{}{}", vector.ciphertext, vector.tag);

    for chunk in 1..=plaintext.len() {
        let output = stream_encrypt(&mechanism, &key, &plaintext, chunk);
        assert_eq!(hex::encode(&output), expected, "chunk size {chunk}");

        let decrypted = stream_decrypt(&mechanism, &key, &output, chunk).expect("Failed to decrypt");
        assert_eq!(decrypted, plaintext, "chunk size {chunk}");
    }
}

#[test]
fn test_gcm_matches_openssl() {
    init_tracing();
    for bits in [128, 192, 256] {
        for iv_len in [12, 1, 8, 60] {
            let key_bytes = pattern(bits / 8, 41);
            let key = AesKey::from_bytes(&key_bytes);
            let iv = pattern(iv_len, 17);
            let aad = pattern(33, 2);
            let plaintext = pattern(77, 8);

            let mut expected_tag = [0u8; 16];
            let expected = openssl::symm::encrypt_aead(
                ossl_cipher(AesMode::Gcm, bits),
                &key_bytes,
                Some(&iv),
                &aad,
                &plaintext,
                &mut expected_tag,
            )
            .expect("OpenSSL GCM encrypt failed");

            let algo = AesModeAlgo::new(gcm(&iv, &aad, 128));
            let output =
                Encrypter::encrypt_vec(&algo, &key, &plaintext).expect("Failed to encrypt");
            assert_eq!(output[..plaintext.len()], expected, "AES-{bits}, IV {iv_len}");
            assert_eq!(output[plaintext.len()..], expected_tag, "AES-{bits}, IV {iv_len}");
        }
    }
}

#[test]
fn test_gcm_truncated_tags() {
    init_tracing();
    let vector = &GCM_VECTORS[3];
    let key = key_from_hex(vector.key);
    let full_tag = unhex(vector.tag);
    let plaintext = unhex(vector.plaintext);

    for tag_bits in [32, 64, 96, 104, 112, 120] {
        let algo = AesModeAlgo::new(gcm(&unhex(vector.iv), &unhex(vector.aad), tag_bits));
        let output = Encrypter::encrypt_vec(&algo, &key, &plaintext).expect("Failed to encrypt");
        assert_eq!(output.len(), plaintext.len() + tag_bits / 8);
        assert_eq!(output[plaintext.len()..], full_tag[..tag_bits / 8]);

        let decrypted = Decrypter::decrypt_vec(&algo, &key, &output).expect("Failed to decrypt");
        assert_eq!(decrypted, plaintext);
    }
}

#[test]
fn test_gcm_tampering_detected_and_nothing_released() {
    init_tracing();
    let vector = &GCM_VECTORS[3];
    let key = key_from_hex(vector.key);
    let algo = AesModeAlgo::new(gcm(&unhex(vector.iv), &unhex(vector.aad), 128));
    let valid = unhex(&format!("{}{}", vector.ciphertext, vector.tag));

    for position in [0, 30, valid.len() - 16, valid.len() - 1] {
        let mut tampered = valid.clone();
        tampered[position] ^= 0x01;

        let mut plaintext = vec![0u8; valid.len() - 16];
        assert_eq!(
            Decrypter::decrypt(&algo, &key, &tampered, Some(&mut plaintext)),
            Err(AesEngineError::InvalidMac),
            "byte {position}"
        );
        assert!(plaintext.iter().all(|&b| b == 0));
    }

    let mut ctx = Decrypter::decrypt_init(algo, &key).expect("Failed to init decryption");
    let mut tampered = valid.clone();
    tampered[5] ^= 0x40;
    assert!(Decrypter::update_vec(&mut ctx, &tampered)
        .expect("Failed to update")
        .is_empty());
    assert_eq!(ctx.finish_vec(), Err(AesEngineError::InvalidMac));
    assert!(!ctx.is_active());
}

#[test]
fn test_gcm_input_shorter_than_tag() {
    init_tracing();
    let key = key_from_hex(GCM_VECTORS[2].key);
    let algo = AesModeAlgo::new(gcm(&[0u8; 12], &[], 128));

    assert_eq!(
        Decrypter::decrypt(&algo, &key, &[0u8; 15], None),
        Err(AesEngineError::EncryptedDataLenRange)
    );

    let mut ctx = Decrypter::decrypt_init(algo, &key).expect("Failed to init decryption");
    Decrypter::update_vec(&mut ctx, &[0u8; 15]).expect("Failed to update");
    assert_eq!(ctx.finish(None), Ok(0));
    assert_eq!(ctx.finish_vec(), Err(AesEngineError::EncryptedDataLenRange));
}

#[test]
fn test_gcm_invalid_parameters() {
    init_tracing();
    let key = key_from_hex(GCM_VECTORS[2].key);

    for mechanism in [gcm(&[], &[], 128), gcm(&[0u8; 12], &[], 40), gcm(&[0u8; 12], &[], 136)] {
        let algo = AesModeAlgo::new(mechanism);
        assert_eq!(
            Encrypter::encrypt(&algo, &key, &[0u8; 16], None),
            Err(AesEngineError::MechanismParamInvalid)
        );
        assert_eq!(
            Decrypter::decrypt(&algo, &key, &[0u8; 32], None),
            Err(AesEngineError::MechanismParamInvalid)
        );
    }
}

#[test]
fn test_gcm_in_place_matches_out_of_place() {
    init_tracing();
    let vector = &GCM_VECTORS[3];
    let key = key_from_hex(vector.key);
    let algo = AesModeAlgo::new(gcm(&unhex(vector.iv), &unhex(vector.aad), 128));
    let plaintext = unhex(vector.plaintext);
    let expected = Encrypter::encrypt_vec(&algo, &key, &plaintext).expect("Failed to encrypt");

    let mut buffer = plaintext.clone();
    buffer.resize(plaintext.len() + 16, 0);
    let written = algo
        .encrypt_in_place(&key, &mut CryptoDataMut::raw(&mut buffer), plaintext.len())
        .expect("Failed to encrypt in place");
    assert_eq!(written, expected.len());
    assert_eq!(buffer, expected);

    let len = buffer.len();
    let written = algo
        .decrypt_in_place(&key, &mut CryptoDataMut::raw(&mut buffer), len)
        .expect("Failed to decrypt in place");
    assert_eq!(&buffer[..written], plaintext);

    // no room for the tag
    let mut short = plaintext.clone();
    assert_eq!(
        algo.encrypt_in_place(&key, &mut CryptoDataMut::raw(&mut short), plaintext.len()),
        Err(AesEngineError::BufferTooSmall {
            required: plaintext.len() + 16
        })
    );
}

#[test]
fn test_gcm_streaming_in_place() {
    init_tracing();
    let vector = &GCM_VECTORS[3];
    let key = key_from_hex(vector.key);
    let mechanism = gcm(&unhex(vector.iv), &unhex(vector.aad), 128);
    let plaintext = unhex(vector.plaintext);
    let expected = format!("{}{}", vector.ciphertext, vector.tag);

    let mut ctx = Encrypter::encrypt_init(AesModeAlgo::new(mechanism.clone()), &key)
        .expect("Failed to init encryption");
    for piece in plaintext.chunks(13) {
        let mut chunk = piece.to_vec();
        assert_eq!(
            ctx.update_in_place(&mut CryptoDataMut::raw(&mut chunk), piece.len()),
            Ok(0)
        );
    }
    let ciphertext = ctx.finish_vec().expect("Failed to finish");
    assert_eq!(hex::encode(&ciphertext), expected);

    let mut ctx = Decrypter::decrypt_init(AesModeAlgo::new(mechanism), &key)
        .expect("Failed to init decryption");
    let mut buffer = ciphertext.clone();
    let len = buffer.len();
    assert_eq!(
        ctx.update_in_place(&mut CryptoDataMut::raw(&mut buffer), len),
        Ok(0)
    );
    assert_eq!(ctx.finish_vec().expect("Failed to finish"), plaintext);
}
