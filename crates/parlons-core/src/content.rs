//! Bundled grammar and vocabulary topics.

use crate::models::CefrLevel;

/// Kind of teaching topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopicCategory {
    Grammar,
    Vocabulary,
}

/// A grammar point or vocabulary field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topic {
    pub id: &'static str,
    pub category: TopicCategory,
    pub level: CefrLevel,
    pub title: &'static str,
    /// Sample words or sentences.
    pub examples: &'static [&'static str],
    /// Points the topic teaches.
    pub rules: &'static [&'static str],
    /// Suggested drills or idiomatic expressions to practice.
    pub exercises: &'static [&'static str],
}

const fn grammar(
    id: &'static str,
    level: CefrLevel,
    title: &'static str,
    examples: &'static [&'static str],
    rules: &'static [&'static str],
    exercises: &'static [&'static str],
) -> Topic {
    Topic {
        id,
        category: TopicCategory::Grammar,
        level,
        title,
        examples,
        rules,
        exercises,
    }
}

const fn vocabulary(
    id: &'static str,
    level: CefrLevel,
    title: &'static str,
    examples: &'static [&'static str],
    exercises: &'static [&'static str],
) -> Topic {
    Topic {
        id,
        category: TopicCategory::Vocabulary,
        level,
        title,
        examples,
        rules: &[],
        exercises,
    }
}

static TOPICS: &[Topic] = &[
    grammar(
        "salutations",
        CefrLevel::A1,
        "Salutations",
        &["Bonjour", "Salut", "Au revoir", "À bientôt", "Bonsoir"],
        &["Formal vs informal greetings", "Time-based greetings", "Cultural context"],
        &["Complete the greeting", "Choose formal/informal", "Match greetings to time"],
    ),
    grammar(
        "weather_seasons",
        CefrLevel::A1,
        "Weather, Seasons, Days, Numbers",
        &["Il fait beau", "L'hiver", "Lundi", "Un, deux, trois"],
        &["Weather expressions", "Season vocabulary", "Days of week", "Cardinal numbers"],
        &["Describe the weather", "Name the seasons", "Count in French"],
    ),
    grammar(
        "definite_articles",
        CefrLevel::A1,
        "Definite Articles (le, la, les)",
        &["le livre", "la maison", "les enfants"],
        &["Gender agreement", "Plural forms", "Contractions"],
        &["Choose correct article", "Gender identification", "Plural forms"],
    ),
    grammar(
        "indefinite_articles",
        CefrLevel::A1,
        "Indefinite Articles (un, une, des)",
        &["un chat", "une voiture", "des amis"],
        &["Gender agreement", "Plural forms", "Usage contexts"],
        &["Choose indefinite article", "Count nouns", "Describe objects"],
    ),
    grammar(
        "subject_pronouns",
        CefrLevel::A1,
        "Subject Pronouns, Auxiliaries, Adjectives",
        &["Je, tu, il", "Être, avoir", "Grand, petite"],
        &["Pronoun usage", "Auxiliary verbs", "Adjective agreement"],
        &["Pronoun practice", "Auxiliary verbs", "Adjective agreement"],
    ),
    grammar(
        "partitive_articles",
        CefrLevel::A2,
        "Partitive Articles (du, de la, des)",
        &["du pain", "de la viande", "des légumes"],
        &["Uncountable nouns", "Food expressions", "Quantity expressions"],
        &["Food vocabulary", "Quantity expressions", "Shopping dialogue"],
    ),
    grammar(
        "aller_prepositions",
        CefrLevel::A2,
        "Aller And Prepositions",
        &["Je vais à Paris", "Aller chez", "Aller en"],
        &["Conjugation of aller", "Preposition usage", "Location expressions"],
        &["Conjugate aller", "Use prepositions", "Location vocabulary"],
    ),
    grammar(
        "tenses",
        CefrLevel::B1,
        "French Tenses",
        &["Présent", "Passé composé", "Futur simple", "Imparfait"],
        &["Tense formation", "Usage contexts", "Conjugation patterns"],
        &["Conjugate verbs", "Choose tense", "Time expressions"],
    ),
    vocabulary(
        "food",
        CefrLevel::A1,
        "Food",
        &["pain", "fromage", "vin", "café", "thé", "eau", "lait", "jus"],
        &["avoir faim", "avoir soif", "avoir un petit creux"],
    ),
    vocabulary(
        "emotions",
        CefrLevel::A1,
        "Emotions",
        &["heureux", "triste", "fatigué", "content", "déçu", "surpris", "inquiet"],
        &["être aux anges", "avoir le cafard", "être sur les nerfs"],
    ),
    vocabulary(
        "body_parts",
        CefrLevel::A1,
        "Body Parts",
        &["tête", "yeux", "nez", "bouche", "oreilles", "cou", "bras", "mains"],
        &["avoir mal à la tête", "se casser la tête"],
    ),
    vocabulary(
        "weather",
        CefrLevel::A2,
        "Weather",
        &["ensoleillé", "pluvieux", "neigeux", "venteux", "nuageux", "orageux"],
        &["il pleut des cordes", "il fait un froid de canard"],
    ),
    vocabulary(
        "work",
        CefrLevel::B1,
        "Work",
        &["bureau", "réunion", "projet", "collègue", "patron", "salaire", "congés"],
        &["être débordé", "avoir du pain sur la planche"],
    ),
    vocabulary(
        "idioms",
        CefrLevel::B2,
        "Idioms",
        &["avoir la pêche", "être dans la lune", "mettre les pieds dans le plat"],
        &["c'est du gâteau", "ça marche comme sur des roulettes"],
    ),
];

/// All bundled topics.
pub fn bundled_topics() -> &'static [Topic] {
    TOPICS
}

/// Topics of a category at or below `level`.
pub fn topics_for(category: TopicCategory, level: CefrLevel) -> impl Iterator<Item = &'static Topic> {
    TOPICS
        .iter()
        .filter(move |t| t.category == category && t.level <= level)
}

/// Look up a topic by id.
pub fn topic(id: &str) -> Option<&'static Topic> {
    TOPICS.iter().find(|t| t.id == id)
}
