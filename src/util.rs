use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub fn stable_pair(id: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}

pub fn ellipsize(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        return label.to_owned();
    }

    let head = label.chars().take(max_chars.saturating_sub(1)).collect::<String>();
    format!("{head}\u{2026}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_pair_is_deterministic_and_bounded() {
        let (x1, y1) = stable_pair("gdpr");
        let (x2, y2) = stable_pair("gdpr");
        assert_eq!((x1, y1), (x2, y2));
        assert!((-1.0..=1.0).contains(&x1));
        assert!((-1.0..=1.0).contains(&y1));
        assert_ne!(stable_pair("gdpr"), stable_pair("lgpd"));
    }

    #[test]
    fn ellipsize_truncates_long_labels() {
        assert_eq!(ellipsize("short", 10), "short");
        let long = ellipsize("a very long assemblage label", 10);
        assert!(long.chars().count() <= 10);
        assert!(long.ends_with('\u{2026}'));
    }
}
