//! End-to-end tests over synthetic clips

use super::*;
use crate::signals::{clip_x, clip_y, clip_z, with_silent_right};
use approx::assert_relative_eq;

fn fingerprint(pcm: &PcmBuffer) -> FingerprintSet {
    compute_fingerprint_set(pcm, &EngineConfig::default()).unwrap()
}

#[test]
fn test_fingerprint_set_is_deterministic() {
    let x = clip_x();
    let first = fingerprint(&x);
    assert_eq!(fingerprint(&x), first);
    assert_eq!(first.bit_len().unwrap(), 256);
    for (_, fp) in first.iter() {
        assert_eq!(fp.to_hex().len(), 64);
    }
}

#[test]
fn test_self_similarity() {
    let set = fingerprint(&clip_y());
    for (_, fp) in set.iter() {
        assert_eq!(hamming_distance(fp, fp).unwrap(), 0);
    }
    assert_relative_eq!(compare(&set, &set).unwrap().score, 100.0);
}

#[test]
fn test_distance_is_symmetric_and_bounded() {
    let x = fingerprint(&clip_x());
    let z = fingerprint(&clip_z());
    for kind in FingerprintKind::ALL {
        let xz = hamming_distance(x.get(kind), z.get(kind)).unwrap();
        assert_eq!(xz, hamming_distance(z.get(kind), x.get(kind)).unwrap());
        assert!(xz <= 256);
    }
}

#[test]
fn test_stereo_uses_first_channel() {
    let x = clip_x();
    assert_eq!(fingerprint(&with_silent_right(&x)), fingerprint(&x));
}

#[test]
fn test_mixing_with_itself_reproduces_fingerprints() {
    let x = clip_x();
    let y = clip_y();
    let original = fingerprint(&x);
    assert_eq!(fingerprint(&mix(&x, &x, 1.0).unwrap()), original);
    assert_eq!(fingerprint(&mix(&x, &y, 1.0).unwrap()), original);

    let blend = fingerprint(&mix(&x, &y, 0.5).unwrap());
    let to_x = compare(&blend, &original).unwrap().score;
    let to_y = compare(&blend, &fingerprint(&y)).unwrap().score;
    assert!(to_x < 100.0, "blend scored {to_x} against x");
    assert!(to_y < 100.0, "blend scored {to_y} against y");
}

#[test]
fn test_weighted_mix_ranks_dominant_clip_first() {
    let x = clip_x();
    let y = clip_y();
    let z = clip_z();

    // insertion order differs from the expected ranking
    let mut catalog = Catalog::new();
    catalog.insert("z", fingerprint(&z));
    catalog.insert("y", fingerprint(&y));
    catalog.insert("x", fingerprint(&x));

    let query = fingerprint(&mix(&x, &y, 0.8).unwrap());
    let results = rank(&query, &catalog).unwrap();

    let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["x", "y", "z"]);
    for kind in FingerprintKind::ALL {
        let scores: Vec<f64> = results.iter().map(|r| r.kind_scores.get(kind)).collect();
        assert!(
            scores[0] > scores[1] && scores[1] > scores[2],
            "{kind} scores out of order: {scores:?}"
        );
    }
    assert_eq!(rank_parallel(&query, &catalog).unwrap(), results);
}

#[test]
fn test_different_hash_sizes_are_incompatible() {
    let x = clip_x();
    let small = EngineConfig {
        hash_size: 8,
        ..EngineConfig::default()
    };
    let long = fingerprint(&x);
    let short = compute_fingerprint_set(&x, &small).unwrap();
    assert_eq!(short.bit_len().unwrap(), 64);

    assert!(matches!(
        hamming_distance(&long.spectrogram, &short.spectrogram),
        Err(SpectroHashError::IncompatibleFingerprint(_))
    ));

    let mut catalog = Catalog::new();
    catalog.insert("short", short);
    assert!(matches!(
        rank(&long, &catalog),
        Err(SpectroHashError::IncompatibleFingerprint(_))
    ));
    assert!(rank(&long, &Catalog::new()).unwrap().is_empty());
}

#[test]
fn test_empty_clip_is_rejected() {
    let empty = PcmBuffer::mono_i16(Vec::new(), 8000).unwrap();
    assert!(matches!(
        compute_fingerprint_set(&empty, &EngineConfig::default()),
        Err(SpectroHashError::InvalidInput(_))
    ));
}
