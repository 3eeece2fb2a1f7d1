//! Archetype classification
//!
//! Maps a trait vector to a base archetype, a subtype, an emoji and a line of
//! commentary. The cascade is ordered and first-match-wins:
//! - two or more traits at 90+ short-circuit to Ascended
//! - otherwise the first primary trait above 70 (C, O, E, A, N) picks the band
//! - the band's secondary conditions pick the subtype
//! - anything unmatched lands on The Wanderer / Undefined

use crate::logging;
use crate::traits::{Trait, TraitVector};
use serde::Serialize;

/// A trait at or above this score counts as extreme.
pub const EXTREME_THRESHOLD: f64 = 90.0;
/// A primary trait strictly above this score opens its band.
pub const BAND_THRESHOLD: f64 = 70.0;
/// Extreme traits needed for the Ascended override.
pub const ASCENDED_MIN_EXTREMES: usize = 2;

pub const DEFAULT_EMOJI: &str = "❓";
pub const DEFAULT_COMMENTARY: &str =
    "An unknown subtype. The archetype engine has no record of this pattern yet.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Archetype {
    Ascended,
    Architect,
    Visionary,
    Spark,
    Harmonizer,
    Reactor,
    Wanderer,
}

impl Archetype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Archetype::Ascended => "Ascended",
            Archetype::Architect => "The Architect",
            Archetype::Visionary => "The Visionary",
            Archetype::Spark => "The Spark",
            Archetype::Harmonizer => "The Harmonizer",
            Archetype::Reactor => "The Reactor",
            Archetype::Wanderer => "The Wanderer",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Archetype::Ascended => "✨",
            Archetype::Architect => "🏛️",
            Archetype::Visionary => "🔭",
            Archetype::Spark => "⚡",
            Archetype::Harmonizer => "🎶",
            Archetype::Reactor => "🌋",
            Archetype::Wanderer => "🌫️",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subtype {
    // Architect
    Builder,
    Planner,
    Strategist,
    Executor,
    // Visionary
    Dreamer,
    Inventor,
    Mystic,
    Explorer,
    // Spark
    Performer,
    Leader,
    Connector,
    Storm,
    // Harmonizer
    Healer,
    Diplomat,
    Friend,
    Listener,
    // Reactor
    Empath,
    Artist,
    Survivor,
    Shadow,
    Undefined,
}

impl Subtype {
    pub const ALL: [Subtype; 21] = [
        Subtype::Builder,
        Subtype::Planner,
        Subtype::Strategist,
        Subtype::Executor,
        Subtype::Dreamer,
        Subtype::Inventor,
        Subtype::Mystic,
        Subtype::Explorer,
        Subtype::Performer,
        Subtype::Leader,
        Subtype::Connector,
        Subtype::Storm,
        Subtype::Healer,
        Subtype::Diplomat,
        Subtype::Friend,
        Subtype::Listener,
        Subtype::Empath,
        Subtype::Artist,
        Subtype::Survivor,
        Subtype::Shadow,
        Subtype::Undefined,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Subtype::Builder => "Builder",
            Subtype::Planner => "Planner",
            Subtype::Strategist => "Strategist",
            Subtype::Executor => "Executor",
            Subtype::Dreamer => "Dreamer",
            Subtype::Inventor => "Inventor",
            Subtype::Mystic => "Mystic",
            Subtype::Explorer => "Explorer",
            Subtype::Performer => "Performer",
            Subtype::Leader => "Leader",
            Subtype::Connector => "Connector",
            Subtype::Storm => "Storm",
            Subtype::Healer => "Healer",
            Subtype::Diplomat => "Diplomat",
            Subtype::Friend => "Friend",
            Subtype::Listener => "Listener",
            Subtype::Empath => "Empath",
            Subtype::Artist => "Artist",
            Subtype::Survivor => "Survivor",
            Subtype::Shadow => "Shadow",
            Subtype::Undefined => "Undefined",
        }
    }
}

/// Emoji for a subtype label. Also knows the "Ascended" label itself.
pub fn subtype_emoji(label: &str) -> &'static str {
    match label {
        "Builder" => "🧱",
        "Planner" => "📐",
        "Strategist" => "♟️",
        "Executor" => "🛠️",
        "Dreamer" => "🌙",
        "Inventor" => "⚙️",
        "Mystic" => "🔮",
        "Explorer" => "🧭",
        "Performer" => "🎭",
        "Leader" => "👑",
        "Connector" => "🤝",
        "Storm" => "🌩️",
        "Healer" => "💊",
        "Diplomat" => "🕊️",
        "Friend" => "😊",
        "Listener" => "👂",
        "Empath" => "💞",
        "Artist" => "🎨",
        "Survivor" => "🧗",
        "Shadow" => "🌑",
        "Undefined" => "❓",
        "Ascended" => "✨",
        _ => DEFAULT_EMOJI,
    }
}

/// One-sentence commentary for a subtype label.
pub fn subtype_commentary(label: &str) -> &'static str {
    match label {
        "Builder" => "You turn bold ideas into load-bearing structures, one deliberate beam at a time.",
        "Planner" => "You map the maze quietly before anyone else has found the entrance.",
        "Strategist" => "You see the whole board and move the pieces so everyone wins a little.",
        "Executor" => "Calm under pressure, you finish what others only start.",
        "Dreamer" => "Your imagination runs deep and restless, chasing worlds that do not exist yet.",
        "Inventor" => "You bolt curiosity to discipline and build the thing you imagined.",
        "Mystic" => "You wander inward, finding meaning in the symbols others walk past.",
        "Explorer" => "New places, new people, new ideas: you reach for all of them at once.",
        "Performer" => "You light up a room and turn every idea into a show.",
        "Leader" => "People follow your energy because you also bring the plan.",
        "Connector" => "You collect people the way others collect stories, and you introduce them all.",
        "Storm" => "Your energy is electric and unpredictable, thunder with a grin.",
        "Healer" => "You feel the hurt in the room and quietly set about mending it.",
        "Diplomat" => "You find the common ground and then build a bridge across it.",
        "Friend" => "Warm and easy to be around, you make strangers feel like regulars.",
        "Listener" => "You hear what people mean, not just what they say.",
        "Empath" => "You absorb the feelings around you and answer them with care.",
        "Artist" => "You turn restless emotion into something beautiful.",
        "Survivor" => "Shaken but organized, you keep going when the ground moves.",
        "Shadow" => "You keep your storms to yourself and watch the world from the edges.",
        "Undefined" => "Your psyche resists easy labels. The oracle needs more of your story.",
        "Ascended" => "Two extremes burn bright in you at once, beyond the ordinary bands.",
        _ => DEFAULT_COMMENTARY,
    }
}

/// Outcome of a classification. Derived on demand, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchetypeResult {
    #[serde(serialize_with = "serialize_archetype")]
    pub base: Archetype,
    pub subtype: String,
    pub emoji: &'static str,
    pub base_emoji: &'static str,
    pub commentary: &'static str,
    pub label: String,
}

fn serialize_archetype<S: serde::Serializer>(a: &Archetype, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(a.as_str())
}

impl ArchetypeResult {
    fn new(base: Archetype, subtype: String) -> Self {
        let label = format!("{} – {}", base.as_str(), subtype);
        Self {
            base,
            emoji: subtype_emoji(&subtype),
            base_emoji: base.emoji(),
            commentary: subtype_commentary(&subtype),
            subtype,
            label,
        }
    }

    fn wanderer() -> Self {
        Self::new(Archetype::Wanderer, Subtype::Undefined.as_str().to_string())
    }

    pub fn is_ascended(&self) -> bool {
        self.base == Archetype::Ascended
    }
}

/// Band priority: the first entry whose trait exceeds the band threshold wins.
const BANDS: [(Trait, Archetype); 5] = [
    (Trait::Conscientiousness, Archetype::Architect),
    (Trait::Openness, Archetype::Visionary),
    (Trait::Extraversion, Archetype::Spark),
    (Trait::Agreeableness, Archetype::Harmonizer),
    (Trait::Neuroticism, Archetype::Reactor),
];

/// Classify a trait vector. Pure apart from a diagnostic log line when the
/// Ascended override fires.
pub fn classify(traits: &TraitVector) -> ArchetypeResult {
    let extremes: Vec<&'static str> = traits
        .iter()
        .filter(|(_, v)| *v >= EXTREME_THRESHOLD)
        .map(|(t, _)| t.as_str())
        .collect();

    if extremes.len() >= ASCENDED_MIN_EXTREMES {
        let subtype = format!("of {}", extremes.join(" & "));
        logging::log_archetype(
            None,
            &format!("Ascended class reached ({}): {}", traits.summary(), subtype),
        );
        return ArchetypeResult::new(Archetype::Ascended, subtype);
    }

    for (primary, base) in BANDS {
        if traits.get(primary) > BAND_THRESHOLD {
            return match band_subtype(base, traits) {
                Some(subtype) => ArchetypeResult::new(base, subtype.as_str().to_string()),
                None => ArchetypeResult::wanderer(),
            };
        }
    }

    ArchetypeResult::wanderer()
}

fn band_subtype(base: Archetype, t: &TraitVector) -> Option<Subtype> {
    let o = t.openness();
    let c = t.conscientiousness();
    let e = t.extraversion();
    let a = t.agreeableness();
    let n = t.neuroticism();

    match base {
        Archetype::Architect => {
            if o > 65.0 {
                Some(Subtype::Builder)
            } else if e < 40.0 {
                Some(Subtype::Planner)
            } else if a > 60.0 {
                Some(Subtype::Strategist)
            } else if n < 40.0 {
                Some(Subtype::Executor)
            } else {
                None
            }
        }
        Archetype::Visionary => {
            if n > 60.0 {
                Some(Subtype::Dreamer)
            } else if c > 60.0 {
                Some(Subtype::Inventor)
            } else if e < 40.0 {
                Some(Subtype::Mystic)
            } else if e > 60.0 {
                Some(Subtype::Explorer)
            } else {
                None
            }
        }
        Archetype::Spark => {
            if o > 60.0 {
                Some(Subtype::Performer)
            } else if c > 60.0 {
                Some(Subtype::Leader)
            } else if a > 60.0 {
                Some(Subtype::Connector)
            } else if n > 60.0 {
                Some(Subtype::Storm)
            } else {
                None
            }
        }
        Archetype::Harmonizer => {
            if n > 60.0 {
                Some(Subtype::Healer)
            } else if c > 60.0 {
                Some(Subtype::Diplomat)
            } else if e > 60.0 {
                Some(Subtype::Friend)
            } else if e < 40.0 {
                Some(Subtype::Listener)
            } else {
                None
            }
        }
        Archetype::Reactor => {
            if a > 60.0 {
                Some(Subtype::Empath)
            } else if o > 60.0 {
                Some(Subtype::Artist)
            } else if c > 60.0 {
                Some(Subtype::Survivor)
            } else if e < 40.0 {
                Some(Subtype::Shadow)
            } else {
                None
            }
        }
        Archetype::Ascended | Archetype::Wanderer => None,
    }
}

/// Share-card text for a classified profile.
pub fn share_text(result: &ArchetypeResult) -> String {
    format!(
        "🎮 I just unlocked my psyche in PROMPTQUEST!\n\nArchetype: {} {}\nSubtype: {} {}\n\n“{}”\n\nCurious what yours is? Try it out: https://promptquest.com #PromptQuest #PersonalityUncovered",
        result.base.as_str(),
        result.base_emoji,
        result.subtype,
        result.emoji,
        result.commentary,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tv(o: f64, c: f64, e: f64, a: f64, n: f64) -> TraitVector {
        TraitVector::new(o, c, e, a, n).unwrap()
    }

    #[test]
    fn test_neutral_vector_is_wanderer() {
        let r = classify(&TraitVector::neutral());
        assert_eq!(r.base, Archetype::Wanderer);
        assert_eq!(r.subtype, "Undefined");
        assert_eq!(r.emoji, "❓");
        assert_eq!(r.label, "The Wanderer – Undefined");
    }

    #[test]
    fn test_two_extremes_ascend() {
        let r = classify(&tv(95.0, 92.0, 40.0, 40.0, 30.0));
        assert_eq!(r.base, Archetype::Ascended);
        assert_eq!(r.subtype, "of Openness & Conscientiousness");
        // composite subtype is not in the table
        assert_eq!(r.emoji, DEFAULT_EMOJI);
        assert_eq!(r.commentary, DEFAULT_COMMENTARY);
        assert_eq!(r.base_emoji, "✨");
    }

    #[test]
    fn test_ascended_lists_traits_in_natural_order() {
        let r = classify(&tv(50.0, 50.0, 91.0, 90.0, 99.0));
        assert_eq!(r.subtype, "of Extraversion & Agreeableness & Neuroticism");
    }

    #[test]
    fn test_ascended_beats_bands() {
        // Conscientiousness alone would open the Architect band
        let r = classify(&tv(50.0, 95.0, 50.0, 50.0, 90.0));
        assert!(r.is_ascended());
    }

    #[test]
    fn test_single_extreme_does_not_ascend() {
        let r = classify(&tv(50.0, 50.0, 30.0, 50.0, 95.0));
        assert_eq!(r.base, Archetype::Reactor);
        assert_eq!(r.subtype, "Shadow");

        let r = classify(&tv(89.9, 95.0, 50.0, 50.0, 30.0));
        assert_eq!(r.base, Archetype::Architect);
        assert_eq!(r.subtype, "Builder");
    }

    #[test]
    fn test_conscientiousness_band_checked_first() {
        let r = classify(&tv(80.0, 80.0, 50.0, 50.0, 50.0));
        assert_eq!(r.base, Archetype::Architect);
        assert_eq!(r.subtype, "Builder");
    }

    #[test]
    fn test_entered_band_without_secondary_falls_back() {
        let r = classify(&tv(50.0, 75.0, 50.0, 50.0, 50.0));
        assert_eq!(r.base, Archetype::Wanderer);
        assert_eq!(r.subtype, "Undefined");
    }

    #[test]
    fn test_unmatched_band_does_not_try_next_band() {
        // Architect band entered with no secondary match; the Spark band would have matched
        let r = classify(&tv(50.0, 75.0, 75.0, 50.0, 50.0));
        assert_eq!(r.base, Archetype::Wanderer);
    }

    #[test]
    fn test_visionary_dreamer() {
        let r = classify(&tv(80.0, 30.0, 30.0, 30.0, 65.0));
        assert_eq!(r.base, Archetype::Visionary);
        assert_eq!(r.subtype, "Dreamer");
        assert_eq!(r.emoji, "🌙");
    }

    #[test]
    fn test_band_thresholds_are_strict() {
        assert_eq!(classify(&tv(50.0, 70.0, 30.0, 50.0, 50.0)).base, Archetype::Wanderer);
        assert_eq!(classify(&tv(50.0, 70.1, 30.0, 50.0, 50.0)).subtype, "Planner");
    }

    #[test]
    fn test_every_subtype_reachable() {
        let cases = [
            (tv(70.0, 80.0, 50.0, 50.0, 50.0), "The Architect", "Builder"),
            (tv(50.0, 80.0, 30.0, 50.0, 50.0), "The Architect", "Planner"),
            (tv(50.0, 80.0, 50.0, 65.0, 50.0), "The Architect", "Strategist"),
            (tv(50.0, 80.0, 50.0, 50.0, 30.0), "The Architect", "Executor"),
            (tv(80.0, 50.0, 50.0, 50.0, 65.0), "The Visionary", "Dreamer"),
            (tv(80.0, 65.0, 50.0, 50.0, 50.0), "The Visionary", "Inventor"),
            (tv(80.0, 50.0, 30.0, 50.0, 50.0), "The Visionary", "Mystic"),
            (tv(80.0, 50.0, 65.0, 50.0, 50.0), "The Visionary", "Explorer"),
            (tv(65.0, 50.0, 80.0, 50.0, 50.0), "The Spark", "Performer"),
            (tv(50.0, 65.0, 80.0, 50.0, 50.0), "The Spark", "Leader"),
            (tv(50.0, 50.0, 80.0, 65.0, 50.0), "The Spark", "Connector"),
            (tv(50.0, 50.0, 80.0, 50.0, 65.0), "The Spark", "Storm"),
            (tv(50.0, 50.0, 50.0, 80.0, 65.0), "The Harmonizer", "Healer"),
            (tv(50.0, 65.0, 50.0, 80.0, 50.0), "The Harmonizer", "Diplomat"),
            (tv(50.0, 50.0, 65.0, 80.0, 50.0), "The Harmonizer", "Friend"),
            (tv(50.0, 50.0, 30.0, 80.0, 50.0), "The Harmonizer", "Listener"),
            (tv(50.0, 50.0, 50.0, 65.0, 80.0), "The Reactor", "Empath"),
            (tv(65.0, 50.0, 50.0, 50.0, 80.0), "The Reactor", "Artist"),
            (tv(50.0, 65.0, 50.0, 50.0, 80.0), "The Reactor", "Survivor"),
            (tv(50.0, 50.0, 30.0, 50.0, 80.0), "The Reactor", "Shadow"),
        ];

        for (traits, base, subtype) in cases {
            let r = classify(&traits);
            assert_eq!((r.base.as_str(), r.subtype.as_str()), (base, subtype), "{}", traits.summary());
        }
    }

    #[test]
    fn test_lookup_tables_cover_every_subtype() {
        for s in Subtype::ALL {
            if s != Subtype::Undefined {
                assert_ne!(subtype_emoji(s.as_str()), DEFAULT_EMOJI, "{}", s.as_str());
            }
            assert_ne!(subtype_commentary(s.as_str()), DEFAULT_COMMENTARY, "{}", s.as_str());
        }
        assert_eq!(subtype_emoji("Ascended"), "✨");
        assert_ne!(subtype_commentary("Ascended"), DEFAULT_COMMENTARY);
        assert_eq!(subtype_emoji("of Openness & Neuroticism"), DEFAULT_EMOJI);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let traits = tv(12.0, 88.0, 35.0, 71.0, 44.0);
        let first = classify(&traits);
        for _ in 0..10 {
            assert_eq!(classify(&traits), first);
        }
    }

    #[test]
    fn test_share_text_includes_result() {
        let r = classify(&tv(80.0, 30.0, 30.0, 30.0, 65.0));
        let text = share_text(&r);
        assert!(text.starts_with("🎮 I just unlocked my psyche in PROMPTQUEST!"));
        assert!(text.contains("Archetype: The Visionary 🔭"));
        assert!(text.contains("Subtype: Dreamer 🌙"));
        assert!(text.contains(r.commentary));
    }

    #[test]
    fn test_serialized_shape() {
        let r = classify(&tv(80.0, 30.0, 30.0, 30.0, 65.0));
        let value = serde_json::to_value(&r).unwrap();
        assert_eq!(value["base"], "The Visionary");
        assert_eq!(value["subtype"], "Dreamer");
        assert_eq!(value["baseEmoji"], "🔭");
        assert_eq!(value["label"], "The Visionary – Dreamer");
    }
}
