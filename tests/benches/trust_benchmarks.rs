//! # Trust Path Benchmarks
//!
//! | Path | Operation |
//! |------|-----------|
//! | oc-03 | adjacent and skipping header verification, proof chain check |
//! | shared-crypto | ECDH key derivation, AEAD seal/open |
//! | oc-01 | sealing a key blob |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use oc_01_sealed_keys::{derive_sealing_key, seal_with_key, SealPolicy, SecretBytes};
use oc_03_trusted_query::{
    verify_block, verify_query, ChainTransport, LightClientConfig, MockChain, Verdict,
};
use shared_crypto::{aead_decrypt, aead_encrypt, derive_shared_key, Kdf, Secp256k1KeyPair};
use shared_types::EnclaveIdentity;
use std::time::Duration;

fn bench_header_verification(c: &mut Criterion) {
    let mut group = c.benchmark_group("oc-03-header-verification");
    group.measurement_time(Duration::from_secs(10));

    for validators in [4usize, 32, 128] {
        let chain = MockChain::with_validators(validators, 10);
        chain.produce_blocks(20);
        let options = LightClientConfig::for_testing(MockChain::CHAIN_ID).verify_options();
        let now = chain.latest_time();
        let trusted = chain.block(1).unwrap();
        let adjacent = chain.block(2).unwrap();
        let skipping = chain.block(20).unwrap();

        group.throughput(Throughput::Elements(validators as u64));
        group.bench_with_input(
            BenchmarkId::new("adjacent", validators),
            &validators,
            |b, _| {
                b.iter(|| {
                    let verdict = verify_block(&trusted, &adjacent, &options, now);
                    assert!(matches!(verdict, Verdict::Success));
                    black_box(verdict)
                })
            },
        );
        group.bench_with_input(
            BenchmarkId::new("skipping", validators),
            &validators,
            |b, _| b.iter(|| black_box(verify_block(&trusted, &skipping, &options, now))),
        );
    }

    group.finish();
}

fn bench_proof_verification(c: &mut Criterion) {
    let mut group = c.benchmark_group("oc-03-proof-verification");

    for records in [16usize, 1_024] {
        let chain = MockChain::with_validators(4, 10);
        for i in 0..records {
            chain.set_state("oracle", format!("record/{i:06}").into_bytes(), vec![7; 128]);
        }
        chain.produce_blocks(2);
        let height = chain.height() - 1;
        let app_hash = chain.block(height + 1).unwrap().header().app_hash;
        let present = b"record/000003".to_vec();
        let absent = b"record/zzzzzz".to_vec();

        let runtime = tokio::runtime::Runtime::new().unwrap();
        let (inclusion, exclusion) = runtime.block_on(async {
            (
                chain.query("oracle", &present, height).await.unwrap(),
                chain.query("oracle", &absent, height).await.unwrap(),
            )
        });

        group.throughput(Throughput::Elements(records as u64));
        group.bench_with_input(BenchmarkId::new("inclusion", records), &records, |b, _| {
            b.iter(|| black_box(verify_query(&inclusion, "oracle", &present, height, &app_hash)))
        });
        group.bench_with_input(BenchmarkId::new("exclusion", records), &records, |b, _| {
            b.iter(|| black_box(verify_query(&exclusion, "oracle", &absent, height, &app_hash)))
        });
    }

    group.finish();
}

fn bench_hybrid_crypto(c: &mut Criterion) {
    let mut group = c.benchmark_group("shared-crypto-hybrid");

    let oracle = Secp256k1KeyPair::generate();
    let seller = Secp256k1KeyPair::generate();
    let nonce = [9u8; 12];

    group.bench_function("derive_shared_key", |b| {
        b.iter(|| black_box(derive_shared_key(&oracle, &seller.public_key(), Kdf::Sha256)))
    });

    let key = derive_shared_key(&oracle, &seller.public_key(), Kdf::Sha256).unwrap();
    for size in [1_024usize, 64 * 1_024, 1_024 * 1_024] {
        let payload = vec![0x5a; size];
        let ciphertext = aead_encrypt(&key, &nonce, &payload).unwrap();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("aead_encrypt", size), &payload, |b, p| {
            b.iter(|| black_box(aead_encrypt(&key, &nonce, p)))
        });
        group.bench_with_input(
            BenchmarkId::new("aead_decrypt", size),
            &ciphertext,
            |b, ct| b.iter(|| black_box(aead_decrypt(&key, &nonce, ct))),
        );
    }

    group.finish();
}

fn bench_sealing(c: &mut Criterion) {
    let mut group = c.benchmark_group("oc-01-sealing");

    let identity = EnclaveIdentity {
        product_id: vec![1],
        signer_id: vec![2; 32],
        unique_id: vec![3; 32],
    };
    let secret = SecretBytes::new(vec![4; 32]);
    let key = derive_sealing_key(&secret, SealPolicy::MrEnclave, &identity);
    let oracle_key = Secp256k1KeyPair::generate().secret_bytes();

    group.bench_function("derive_sealing_key", |b| {
        b.iter(|| black_box(derive_sealing_key(&secret, SealPolicy::MrEnclave, &identity)))
    });
    group.bench_function("seal_key", |b| {
        b.iter(|| black_box(seal_with_key(&key, SealPolicy::MrEnclave, &oracle_key[..])))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_header_verification,
    bench_proof_verification,
    bench_hybrid_crypto,
    bench_sealing
);
criterion_main!(benches);
