//! # Header Verification
//!
//! Verifies one untrusted light block from one trusted light block.
//!
//! | Case | Requirement |
//! |------|-------------|
//! | adjacent (h+1) | `validators_hash` equals trusted `next_validators_hash`, > 2/3 of the new set signed |
//! | skipping | ≥ trust level of the trusted next set signed, > 2/3 of the new set signed |
//!
//! Both cases require the same chain, monotonic time, a header no further
//! than the clock drift in the future, and a trusted block still inside the
//! trusting period.

use crate::domain::{Commit, CanonicalVote, LightBlock, TrustThreshold, ValidatorSet, Verdict};
use shared_crypto::{Secp256k1PublicKey, Secp256k1Signature};
use std::collections::HashSet;

/// Parameters of one verification.
#[derive(Debug, Clone)]
pub struct VerifyOptions {
    /// Chain the blocks must belong to.
    pub chain_id: String,
    /// Skipping trust level.
    pub trust_threshold: TrustThreshold,
    /// How long a trusted header stays usable, seconds.
    pub trusting_period_secs: u64,
    /// Allowed clock drift, seconds.
    pub max_clock_drift_secs: u64,
}

/// Check a light block on its own: commit matches header, sets match
/// hashes.
pub fn validate_light_block(block: &LightBlock, chain_id: &str) -> Result<(), String> {
    let header = block.header();
    let commit = &block.signed_header.commit;

    if header.chain_id != chain_id {
        return Err(format!("chain id {} != {}", header.chain_id, chain_id));
    }
    if commit.height != header.height {
        return Err(format!(
            "commit height {} != header height {}",
            commit.height, header.height
        ));
    }
    if commit.block_hash != header.hash() {
        return Err("commit does not sign this header".into());
    }
    if block.validators.hash() != header.validators_hash {
        return Err("validator set does not match header".into());
    }
    if block.next_validators.hash() != header.next_validators_hash {
        return Err("next validator set does not match header".into());
    }
    Ok(())
}

/// Voting power of `set` members that signed `commit`.
///
/// Signers outside `set` are skipped unless `require_known` is set. Any
/// duplicate signer or invalid signature of a counted validator is an error.
pub fn tally_voting_power(
    commit: &Commit,
    chain_id: &str,
    set: &ValidatorSet,
    require_known: bool,
) -> Result<u64, String> {
    let sign_bytes = CanonicalVote {
        chain_id: chain_id.to_string(),
        height: commit.height,
        block_hash: commit.block_hash,
    }
    .sign_bytes();

    let mut seen = HashSet::new();
    let mut tallied = 0u64;
    for sig in &commit.signatures {
        if !seen.insert(sig.validator_address) {
            return Err(format!(
                "duplicate signature from {}",
                hex::encode(sig.validator_address)
            ));
        }
        let Some(validator) = set.get(&sig.validator_address) else {
            if require_known {
                return Err(format!(
                    "signer {} not in validator set",
                    hex::encode(sig.validator_address)
                ));
            }
            continue;
        };
        let pub_key = Secp256k1PublicKey::from_slice(&validator.pub_key)
            .map_err(|e| format!("validator key: {e}"))?;
        let signature = Secp256k1Signature::from_slice(&sig.signature)
            .map_err(|e| format!("commit signature: {e}"))?;
        pub_key.verify(&sign_bytes, &signature).map_err(|_| {
            format!(
                "invalid commit signature from {}",
                hex::encode(sig.validator_address)
            )
        })?;
        tallied = tallied.saturating_add(validator.power);
    }
    Ok(tallied)
}

/// Verify `untrusted` from `trusted` at wall-clock time `now` (unix secs).
pub fn verify_block(
    trusted: &LightBlock,
    untrusted: &LightBlock,
    options: &VerifyOptions,
    now: u64,
) -> Verdict {
    match check_block(trusted, untrusted, options, now) {
        Ok(verdict) => verdict,
        Err(reason) => Verdict::Invalid(reason),
    }
}

fn check_block(
    trusted: &LightBlock,
    untrusted: &LightBlock,
    options: &VerifyOptions,
    now: u64,
) -> Result<Verdict, String> {
    let trusted_header = trusted.header();
    let header = untrusted.header();

    if trusted_header.time.saturating_add(options.trusting_period_secs) <= now {
        return Err(format!(
            "trusted block {} expired",
            trusted_header.height
        ));
    }
    validate_light_block(untrusted, &options.chain_id)?;

    if header.height <= trusted_header.height {
        return Err(format!(
            "height {} not above trusted {}",
            header.height, trusted_header.height
        ));
    }
    if header.time <= trusted_header.time {
        return Err("header time not after trusted time".into());
    }
    if header.time > now.saturating_add(options.max_clock_drift_secs) {
        return Err("header time in the future".into());
    }

    let commit = &untrusted.signed_header.commit;
    if header.height == trusted_header.height + 1 {
        if header.validators_hash != trusted_header.next_validators_hash {
            return Err("validator set does not follow trusted next set".into());
        }
        if header.last_block_hash != trusted.hash() {
            return Err("last block hash does not link to trusted header".into());
        }
    } else {
        let total = trusted.next_validators.total_power();
        let tallied =
            tally_voting_power(commit, &options.chain_id, &trusted.next_validators, false)?;
        if !options.trust_threshold.is_met(tallied, total) {
            return Ok(Verdict::NotEnoughTrust { tallied, total });
        }
    }

    let total = untrusted.validators.total_power();
    let tallied = tally_voting_power(commit, &options.chain_id, &untrusted.validators, true)?;
    if !TrustThreshold::TWO_THIRDS.is_exceeded(tallied, total) {
        return Err(format!("commit power {tallied}/{total} not above 2/3"));
    }
    Ok(Verdict::Success)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::MockChain;

    const NOW_OFFSET: u64 = 10;

    fn options() -> VerifyOptions {
        VerifyOptions {
            chain_id: MockChain::CHAIN_ID.into(),
            trust_threshold: TrustThreshold::ONE_THIRD,
            trusting_period_secs: 3_600,
            max_clock_drift_secs: 5,
        }
    }

    fn now(chain: &MockChain) -> u64 {
        chain.latest_time() + NOW_OFFSET
    }

    #[test]
    fn test_adjacent_success() {
        let chain = MockChain::with_validators(4, 10);
        chain.produce_blocks(3);
        let v = verify_block(&chain.block(1).unwrap(), &chain.block(2).unwrap(), &options(), now(&chain));
        assert_eq!(v, Verdict::Success);
    }

    #[test]
    fn test_skipping_success_with_stable_set() {
        let chain = MockChain::with_validators(4, 10);
        chain.produce_blocks(20);
        let v = verify_block(&chain.block(1).unwrap(), &chain.block(20).unwrap(), &options(), now(&chain));
        assert_eq!(v, Verdict::Success);
    }

    #[test]
    fn test_skipping_after_full_rotation_needs_bisection() {
        let chain = MockChain::with_validators(4, 10);
        chain.produce_blocks(5);
        chain.rotate_validators(4, 10);
        chain.produce_blocks(5);
        let v = verify_block(&chain.block(1).unwrap(), &chain.block(10).unwrap(), &options(), now(&chain));
        assert!(matches!(v, Verdict::NotEnoughTrust { tallied: 0, .. }));
    }

    #[test]
    fn test_tampered_app_hash_invalid() {
        let chain = MockChain::with_validators(4, 10);
        chain.produce_blocks(3);
        let mut block = chain.block(3).unwrap();
        block.signed_header.header.app_hash[0] ^= 1;
        let v = verify_block(&chain.block(1).unwrap(), &block, &options(), now(&chain));
        assert!(matches!(v, Verdict::Invalid(_)));
    }

    #[test]
    fn test_bad_signature_invalid() {
        let chain = MockChain::with_validators(4, 10);
        chain.produce_blocks(3);
        let mut block = chain.block(2).unwrap();
        block.signed_header.commit.signatures[0].signature[3] ^= 1;
        let v = verify_block(&chain.block(1).unwrap(), &block, &options(), now(&chain));
        assert!(matches!(v, Verdict::Invalid(_)));
    }

    #[test]
    fn test_too_few_signatures_invalid() {
        let chain = MockChain::with_validators(3, 10);
        chain.produce_blocks(3);
        let mut block = chain.block(2).unwrap();
        block.signed_header.commit.signatures.truncate(2);
        let v = verify_block(&chain.block(1).unwrap(), &block, &options(), now(&chain));
        assert!(matches!(v, Verdict::Invalid(reason) if reason.contains("2/3")));
    }

    #[test]
    fn test_duplicate_signer_invalid() {
        let chain = MockChain::with_validators(4, 10);
        chain.produce_blocks(3);
        let mut block = chain.block(2).unwrap();
        let dup = block.signed_header.commit.signatures[0].clone();
        block.signed_header.commit.signatures.push(dup);
        let v = verify_block(&chain.block(1).unwrap(), &block, &options(), now(&chain));
        assert!(matches!(v, Verdict::Invalid(reason) if reason.contains("duplicate")));
    }

    #[test]
    fn test_expired_trust_invalid() {
        let chain = MockChain::with_validators(4, 10);
        chain.produce_blocks(3);
        let late = chain.block(1).unwrap().header().time + options().trusting_period_secs;
        let v = verify_block(&chain.block(1).unwrap(), &chain.block(2).unwrap(), &options(), late);
        assert!(matches!(v, Verdict::Invalid(reason) if reason.contains("expired")));
    }

    #[test]
    fn test_future_header_invalid() {
        let chain = MockChain::with_validators(4, 10);
        chain.produce_blocks(3);
        let early = chain.block(1).unwrap().header().time;
        let v = verify_block(&chain.block(1).unwrap(), &chain.block(3).unwrap(), &options(), early);
        assert!(matches!(v, Verdict::Invalid(reason) if reason.contains("future")));
    }

    #[test]
    fn test_wrong_chain_invalid() {
        let chain = MockChain::with_validators(4, 10);
        chain.produce_blocks(3);
        let mut opts = options();
        opts.chain_id = "other".into();
        let v = verify_block(&chain.block(1).unwrap(), &chain.block(2).unwrap(), &opts, now(&chain));
        assert!(matches!(v, Verdict::Invalid(_)));
    }

    #[test]
    fn test_backward_invalid() {
        let chain = MockChain::with_validators(4, 10);
        chain.produce_blocks(3);
        let v = verify_block(&chain.block(3).unwrap(), &chain.block(2).unwrap(), &options(), now(&chain));
        assert!(matches!(v, Verdict::Invalid(_)));
    }
}
