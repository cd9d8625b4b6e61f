use crate::{item::Topic, text::normalize_title};

pub const ATTACK_KEYWORDS: &[&str] = &[
    "backdoor attack",
    "backdoor injection",
    "backdooring",
    "backdoored model",
    "invisible backdoor",
    "trojan attack",
    "trojaning attack",
    "neural trojan",
    "hidden trigger",
    "trigger injection",
    "poisoning attack",
    "data poisoning",
    "clean label poisoning",
];

pub const DEFENSE_KEYWORDS: &[&str] = &[
    "backdoor defense",
    "backdoor defence",
    "backdoor detection",
    "detecting backdoor",
    "backdoor removal",
    "removing backdoor",
    "backdoor mitigation",
    "mitigating backdoor",
    "backdoor purification",
    "purifying backdoor",
    "defending against backdoor",
    "defense against backdoor",
    "trojan detection",
    "detecting trojan",
    "poisoning defense",
    "certified robustness against",
    "neural cleanse",
];

/// Tags titles as attack, defense or both by substring containment against
/// two keyword lists. Both the title and the keywords go through
/// [`normalize_title`], so matching is case and punctuation insensitive.
#[derive(Debug, Clone)]
pub struct Classifier {
    attack: Vec<String>,
    defense: Vec<String>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(ATTACK_KEYWORDS, DEFENSE_KEYWORDS)
    }
}

impl Classifier {
    pub fn new<A, D>(attack: &[A], defense: &[D]) -> Self
    where
        A: AsRef<str>,
        D: AsRef<str>,
    {
        fn prepare<S: AsRef<str>>(list: &[S]) -> Vec<String> {
            list.iter()
                .map(|k| normalize_title(k.as_ref()))
                .filter(|k| !k.is_empty())
                .collect()
        }
        Classifier {
            attack: prepare(attack),
            defense: prepare(defense),
        }
    }

    /// `None` means the title matched neither list.
    pub fn classify(&self, title: &str) -> Option<Topic> {
        let norm = normalize_title(title);
        let attack = self.attack.iter().any(|k| norm.contains(k.as_str()));
        let defense = self.defense.iter().any(|k| norm.contains(k.as_str()));
        match (attack, defense) {
            (true, true) => Some(Topic::Both),
            (true, false) => Some(Topic::Attack),
            (false, true) => Some(Topic::Defense),
            (false, false) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::strategy::Strategy;

    fn filler() -> impl Strategy<Value = String> {
        // Digits only, so filler can never spell a keyword.
        proptest::collection::vec("[0-9]{1,4}", 0..4).prop_map(|v| v.join(" "))
    }

    /// Mangle a keyword the way venue titles do: odd casing, hyphens, trailing punctuation.
    fn mangle(keyword: &str, upper: bool) -> String {
        let cased = if upper { keyword.to_uppercase() } else { keyword.to_string() };
        format!("{}!", cased.replace(' ', "-"))
    }

    #[test]
    fn attack_only_titles_are_attack() {
        proptest::proptest!(|(
            pre in filler(),
            post in filler(),
            idx in 0..ATTACK_KEYWORDS.len(),
            upper in proptest::bool::ANY,
        )| {
            let title = format!("{pre} {} {post}", mangle(ATTACK_KEYWORDS[idx], upper));
            proptest::prop_assert_eq!(Classifier::default().classify(&title), Some(Topic::Attack));
        })
    }

    #[test]
    fn defense_only_titles_are_defense() {
        proptest::proptest!(|(
            pre in filler(),
            post in filler(),
            idx in 0..DEFENSE_KEYWORDS.len(),
            upper in proptest::bool::ANY,
        )| {
            let title = format!("{pre} {} {post}", mangle(DEFENSE_KEYWORDS[idx], upper));
            proptest::prop_assert_eq!(Classifier::default().classify(&title), Some(Topic::Defense));
        })
    }

    #[test]
    fn both_lists_matching_is_both() {
        proptest::proptest!(|(
            a in 0..ATTACK_KEYWORDS.len(),
            d in 0..DEFENSE_KEYWORDS.len(),
            mid in filler(),
        )| {
            let title = format!("{} {mid} {}", ATTACK_KEYWORDS[a], DEFENSE_KEYWORDS[d]);
            proptest::prop_assert_eq!(Classifier::default().classify(&title), Some(Topic::Both));
        })
    }

    #[test]
    fn unrelated_titles_are_none() {
        proptest::proptest!(|(title in filler())| {
            proptest::prop_assert_eq!(Classifier::default().classify(&title), None);
        })
    }

    #[test]
    fn punctuation_and_case_are_ignored() {
        let c = Classifier::default();
        assert_eq!(c.classify("Backdoor-Attack!"), Some(Topic::Attack));
        assert_eq!(c.classify("NEURAL CLEANSE: Identifying Backdoors"), Some(Topic::Defense));
        assert_eq!(c.classify("An Unrelated Paper"), None);
    }

    #[test]
    fn custom_keywords_are_normalised() {
        let c = Classifier::new(&["Model-Stealing"], &["WATERMARK"]);
        assert_eq!(c.classify("model stealing via queries"), Some(Topic::Attack));
        assert_eq!(c.classify("Robust watermarks"), Some(Topic::Defense));
    }
}
