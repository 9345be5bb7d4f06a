//! Script synthesis from mood/category template sets.
//!
//! Pure and deterministic: a category is selected from subject keywords
//! (ordered table, first match wins), a template set is selected by
//! (mood, category) with fallback to the mood's default set, and the
//! subject is substituted into the templates. No external failure surface
//! beyond input validation.

use tracing::debug;

use reelgen_models::{Mood, ScriptLine, SCRIPT_LINE_COUNT};

use crate::error::{PipelineError, PipelineResult};

/// Ordered subject-keyword table. Evaluated first-match-wins, so keyword
/// overlap between categories is resolved by position.
const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "beauty",
        &["glow", "serum", "skin", "face", "beauty", "cream", "makeup", "hair"],
    ),
    (
        "tech",
        &["phone", "gadget", "smart", "tech", "wireless", "charger", "earbud", "laptop"],
    ),
    (
        "fashion",
        &["wear", "shoe", "sneaker", "jacket", "dress", "fashion", "watch", "bag"],
    ),
    (
        "food",
        &["snack", "drink", "coffee", "protein", "tea", "sauce", "chocolate", "juice"],
    ),
];

/// Category used when no keyword matches.
const DEFAULT_CATEGORY: &str = "default";

/// Select the script category for a subject. First match wins.
pub fn select_category(subject: &str) -> &'static str {
    let subject = subject.to_lowercase();
    for (category, keywords) in CATEGORY_KEYWORDS {
        if keywords.iter().any(|k| subject.contains(k)) {
            return category;
        }
    }
    DEFAULT_CATEGORY
}

/// A mood's template sets: the default-category set plus any specialized
/// category sets.
struct MoodTemplates {
    mood: Mood,
    default_set: [&'static str; SCRIPT_LINE_COUNT],
    category_sets: &'static [(&'static str, [&'static str; SCRIPT_LINE_COUNT])],
}

const TEMPLATE_SETS: &[MoodTemplates] = &[
    MoodTemplates {
        mood: Mood::Energetic,
        default_set: [
            "Stop scrolling. You need to see this.",
            "{subject} is about to change your day.",
            "No gimmicks. Just results.",
            "People keep asking what the secret is.",
            "It's {subject}. That's the secret.",
            "Built for people who don't slow down.",
            "One try and you'll get the hype.",
            "Your friends will ask where you got it.",
            "{subject}. Remember the name.",
            "Grab yours before everyone else does.",
        ],
        category_sets: &[
            (
                "beauty",
                [
                    "Stop scrolling. Your skin will thank you.",
                    "{subject} is the glow-up nobody gatekept.",
                    "Real results, no filters needed.",
                    "That lit-from-within look? It's real.",
                    "{subject} works while you sleep.",
                    "Dermatologist-approved, routine-proof.",
                    "One week in and people notice.",
                    "Your mirror is about to become your hype squad.",
                    "{subject}. Glow loud.",
                    "Get yours before it sells out again.",
                ],
            ),
            (
                "tech",
                [
                    "Stop scrolling. This is the upgrade.",
                    "{subject} just made everything else obsolete.",
                    "Setup takes seconds. Seriously.",
                    "Power that fits in your pocket.",
                    "{subject} keeps up when you speed up.",
                    "No cables. No excuses.",
                    "Once you try it, there's no going back.",
                    "Your old setup is officially retired.",
                    "{subject}. Future, delivered.",
                    "Order now and feel the difference today.",
                ],
            ),
        ],
    },
    MoodTemplates {
        mood: Mood::Funny,
        default_set: [
            "Okay, hear me out.",
            "{subject} has no business being this good.",
            "We tested it so you don't embarrass yourself.",
            "Spoiler: it passed.",
            "Your wallet might complain. Ignore it.",
            "{subject} understands you better than your ex.",
            "Side effects may include showing off.",
            "Yes, your neighbor already has one.",
            "{subject}. Obviously.",
            "Buy it before we make another ad.",
        ],
        category_sets: &[(
            "beauty",
            [
                "Okay, hear me out.",
                "{subject} woke up and chose glow.",
                "Your skincare shelf called. It's jealous.",
                "We put it on. We couldn't stop staring.",
                "Is it magic? Legally we can't say yes.",
                "{subject} does more before 9am than most of us all day.",
                "Warning: compliments incoming.",
                "Your selfie camera deserves this.",
                "{subject}. Science, but make it cute.",
                "Add to cart. Thank us later.",
            ],
        )],
    },
    MoodTemplates {
        mood: Mood::Luxurious,
        default_set: [
            "Some things simply cannot be rushed.",
            "{subject} was crafted for a select few.",
            "Every detail, deliberately considered.",
            "Quiet quality speaks the loudest.",
            "{subject} doesn't follow trends. It sets them.",
            "An experience, not a purchase.",
            "Those who know, know.",
            "Indulgence, refined to its essence.",
            "{subject}. Nothing less.",
            "Reserve yours. Excellence is limited.",
        ],
        category_sets: &[],
    },
    MoodTemplates {
        mood: Mood::Professional,
        default_set: [
            "Here's what the data says.",
            "{subject} solves a problem you have every day.",
            "Designed with intention, tested with rigor.",
            "Thousands of customers. One consistent verdict.",
            "{subject} delivers exactly what it promises.",
            "No learning curve. No wasted time.",
            "Quality you can measure.",
            "Backed by people who stand behind it.",
            "{subject}. A decision you won't revisit.",
            "See for yourself today.",
        ],
        category_sets: &[],
    },
];

/// Find the template set for (mood, category), falling back to the mood's
/// default-category set.
fn select_templates(mood: Mood, category: &str) -> &'static [&'static str; SCRIPT_LINE_COUNT] {
    let mood_templates = TEMPLATE_SETS
        .iter()
        .find(|t| t.mood == mood)
        .unwrap_or(&TEMPLATE_SETS[0]);

    mood_templates
        .category_sets
        .iter()
        .find(|(c, _)| *c == category)
        .map(|(_, set)| set)
        .unwrap_or(&mood_templates.default_set)
}

/// Synthesize the promo script for a subject.
///
/// Always returns exactly [`SCRIPT_LINE_COUNT`] lines. The locale hint
/// currently selects the English template tables only; other locales fall
/// back to English.
pub fn synthesize(subject: &str, mood: Mood, _locale: &str) -> PipelineResult<Vec<ScriptLine>> {
    let subject = subject.trim();
    if subject.is_empty() {
        return Err(PipelineError::invalid_request("subject must not be empty"));
    }

    let category = select_category(subject);
    let templates = select_templates(mood, category);
    debug!(
        "Synthesizing script: mood={}, category={}",
        mood, category
    );

    Ok(templates
        .iter()
        .enumerate()
        .map(|(index, template)| ScriptLine::new(index, template.replace("{subject}", subject)))
        .collect())
}
