//! Utilities for generating passwords.

use rand::{CryptoRng, RngCore};

use crate::policy::ResolvedPools;

/// Generate a password of exactly `len` characters from the given pools.
///
/// Every enabled class gets at least one character. When `len` is too short to hold one of each,
/// classes are served in declaration order (lowercase, uppercase, digit, special) until the
/// positions run out. The remaining positions are filled from the combined pool, and the result
/// is shuffled so the guaranteed characters don't sit at the front.
///
/// Every random decision is drawn from `rng`. If it fails at any point the error is returned, and
/// nothing built so far escapes.
pub fn generate<R>(
    rng: &mut R,
    pools: &ResolvedPools,
    len: usize,
) -> Result<crate::GeneratedPassword, rand::Error>
where
    R: RngCore + CryptoRng,
{
    let combined = pools.combined();
    let fill = (0..len)
        .map(|_| next_u32(rng))
        .collect::<Result<Vec<_>, _>>()?;

    let mut chars = Vec::with_capacity(len);
    for (_, pool) in pools.enabled().take(len) {
        chars.push(pool[random_below(rng, pool.len())?]);
    }
    let guaranteed = chars.len();

    // `fill` is indexed by final position, so the slots taken by guaranteed characters leave
    // their draws unused.
    for &value in &fill[guaranteed..] {
        chars.push(combined[value as usize % combined.len()]);
    }

    shuffle(rng, &mut chars)?;
    log::debug!(
        "generated a {}-character password ({} guaranteed, pool of {})",
        chars.len(),
        guaranteed,
        combined.len()
    );
    Ok(crate::GeneratedPassword(chars.into_iter().collect()))
}

/// Fisher-Yates shuffle, with each swap index drawn uniformly from `0..=i`.
pub fn shuffle<R, T>(rng: &mut R, items: &mut [T]) -> Result<(), rand::Error>
where
    R: RngCore + CryptoRng,
{
    for i in (1..items.len()).rev() {
        let j = random_below(rng, i + 1)?;
        items.swap(i, j);
    }
    Ok(())
}

fn next_u32<R: RngCore>(rng: &mut R) -> Result<u32, rand::Error> {
    let mut buf = [0u8; 4];
    rng.try_fill_bytes(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// A uniformly distributed value in `0..bound`.
///
/// Draws below `2^32 mod bound` are rejected, which leaves a range whose size is a multiple of
/// `bound`.
fn random_below<R: RngCore>(rng: &mut R, bound: usize) -> Result<usize, rand::Error> {
    debug_assert!(bound > 0 && bound <= u32::MAX as usize);
    let bound = bound as u32;
    let threshold = bound.wrapping_neg() % bound;
    loop {
        let value = next_u32(rng)?;
        if value >= threshold {
            return Ok((value % bound) as usize);
        }
    }
}
