//! Phrase and conversation-turn catalog.

use crate::error::{Error, Result};
use crate::models::{CefrLevel, Difficulty, LearningItem};
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};

/// Read-only collection of learning items.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<LearningItem>,
    index: HashMap<String, usize>,
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    items: Vec<LearningItem>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate ids.
    pub fn new(items: Vec<LearningItem>) -> Result<Self> {
        let mut index = HashMap::with_capacity(items.len());
        for (pos, item) in items.iter().enumerate() {
            if item.id.is_empty() {
                return Err(Error::InvalidState("item with empty id".to_string()));
            }
            if index.insert(item.id.clone(), pos).is_some() {
                return Err(Error::InvalidState(format!("duplicate item id: {}", item.id)));
            }
        }
        Ok(Self { items, index })
    }

    /// Parse a user catalog (`[[items]]` tables).
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(s)?;
        Self::new(file.items)
    }

    /// The bundled catalog.
    pub fn builtin() -> Self {
        let items = bundled_items();
        let index = items
            .iter()
            .enumerate()
            .map(|(pos, item)| (item.id.clone(), pos))
            .collect();
        Self { items, index }
    }

    /// All items in load order.
    pub fn get_all(&self) -> &[LearningItem] {
        &self.items
    }

    pub fn get_by_id(&self, id: &str) -> Option<&LearningItem> {
        self.index.get(id).map(|&pos| &self.items[pos])
    }

    pub fn get_by_category(&self, category: &str) -> Vec<&LearningItem> {
        self.items.iter().filter(|i| i.category == category).collect()
    }

    /// Items at or below a level.
    pub fn up_to_level(&self, level: CefrLevel) -> impl Iterator<Item = &LearningItem> {
        self.items.iter().filter(move |i| i.level <= level)
    }

    /// Sorted distinct category labels.
    pub fn categories(&self) -> Vec<&str> {
        self.items
            .iter()
            .map(|i| i.category.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Learner turns of a conversation in load order.
    pub fn conversation(&self, id: &str) -> Vec<&LearningItem> {
        self.items
            .iter()
            .filter(|i| i.conversation.as_deref() == Some(id))
            .collect()
    }

    /// Conversation ids in order of first appearance.
    pub fn conversations(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for id in self.items.iter().filter_map(|i| i.conversation.as_deref()) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn bundled_items() -> Vec<LearningItem> {
    vec![
        // A1 foundation phrases
        LearningItem::new("a1_1", "Bonjour", "Hello", "salutations")
            .with_pronunciation("bohn-ZHOOR")
            .with_context("greeting")
            .with_cultural_note("Used throughout the day, formal greeting"),
        LearningItem::new("a1_2", "Comment allez-vous ?", "How are you?", "salutations")
            .with_pronunciation("koh-MAHN tah-lay-VOO")
            .with_context("greeting")
            .with_cultural_note("Formal way to ask about someone's well-being"),
        LearningItem::new("a1_3", "Je vais bien", "I am well", "wellbeing")
            .with_pronunciation("zhuh vay bee-AHN")
            .with_context("response")
            .with_cultural_note("Standard response to 'how are you'"),
        LearningItem::new("a1_4", "Merci", "Thank you", "politeness")
            .with_pronunciation("mehr-SEE")
            .with_context("gratitude")
            .with_cultural_note("Essential in French culture"),
        LearningItem::new("a1_5", "S'il vous plaît", "Please", "politeness")
            .with_pronunciation("seel voo PLEH")
            .with_context("request")
            .with_cultural_note("Formal way to say please"),
        LearningItem::new("a1_6", "Au revoir", "Goodbye", "salutations")
            .with_pronunciation("oh ruh-VWAHR")
            .with_context("farewell")
            .with_cultural_note("Standard goodbye"),
        LearningItem::new("a1_7", "Oui", "Yes", "basic_responses")
            .with_pronunciation("wee")
            .with_context("agreement"),
        LearningItem::new("a1_8", "Non", "No", "basic_responses")
            .with_pronunciation("nohn")
            .with_context("disagreement"),
        LearningItem::new("a1_9", "Je ne comprends pas", "I don't understand", "communication")
            .with_pronunciation("zhuh nuh kohn-PRAHN pah")
            .with_context("confusion")
            .with_cultural_note("Essential phrase for learners"),
        LearningItem::new("a1_10", "Pouvez-vous répéter ?", "Can you repeat?", "communication")
            .with_pronunciation("poo-vay-VOO ray-pay-TAY")
            .with_context("request")
            .with_cultural_note("Polite way to ask for repetition"),
        // Lesson phrases
        LearningItem::new(
            "lesson_1_1",
            "Je comprends le français un peu",
            "I understand French a little",
            "introduction",
        )
        .with_pronunciation("zhuh kohn-prahn luh frahn-say uhn puh")
        .with_context("Introducing your French level"),
        LearningItem::new("lesson_1_2", "Je parle français un peu", "I speak French a little", "introduction")
            .with_pronunciation("zhuh parl frahn-say uhn puh")
            .with_context("Stating your speaking ability"),
        LearningItem::new("lesson_2_1", "Comment allez-vous monsieur ?", "How are you sir?", "greetings")
            .with_pronunciation("koh-mahn tah-lay voo muh-syuh")
            .with_context("Formal greeting"),
        LearningItem::new("lesson_2_2", "Je vais bien, merci", "I am well, thank you", "greetings")
            .with_pronunciation("zhuh vay bee-ahn mehr-see")
            .with_context("Responding to greeting"),
        // Library conversation, learner turns
        LearningItem::new(
            "library_2",
            "Bonjour, je cherche un livre",
            "Hello, I am looking for a book",
            "library",
        )
        .with_pronunciation("bohn-zhoor, zhuh shersh uhn leevr")
        .with_context("You respond to the librarian with a simple request")
        .with_alternative("Bonjour, je voudrais un livre")
        .with_alternative("Bonjour, j'ai besoin d'un livre")
        .with_difficulty(Difficulty::Medium)
        .with_level(CefrLevel::A2)
        .in_conversation("library"),
        LearningItem::new(
            "library_4",
            "Je cherche un roman français",
            "I am looking for a French novel",
            "library",
        )
        .with_pronunciation("zhuh shersh uhn roh-mahn frahn-say")
        .with_context("You specify the type of book you want")
        .with_alternative("Je voudrais un roman français")
        .with_alternative("J'ai besoin d'un roman français")
        .with_difficulty(Difficulty::Medium)
        .with_level(CefrLevel::A2)
        .in_conversation("library"),
        // Restaurant and travel conversations, learner turns
        LearningItem::new(
            "restaurant_2",
            "Non, je n'ai pas de réservation",
            "No, I don't have a reservation",
            "restaurant",
        )
        .with_pronunciation("nohn, zhuh nay pah duh ray-zer-vah-see-ohn")
        .with_context("You tell the waiter you have not booked")
        .with_alternative("Non, pas de réservation")
        .with_alternative("Je n'ai pas réservé")
        .with_difficulty(Difficulty::Medium)
        .with_level(CefrLevel::A2)
        .in_conversation("restaurant"),
        LearningItem::new(
            "travel_2",
            "Oui, s'il vous plaît. Je cherche la gare",
            "Yes, please. I am looking for the train station",
            "travel",
        )
        .with_pronunciation("wee, seel voo play, zhuh shersh lah gahr")
        .with_context("You accept help and ask the way to the station")
        .with_alternative("Oui, merci. Où est la gare ?")
        .with_alternative("Oui, je cherche la gare")
        .with_difficulty(Difficulty::Medium)
        .with_level(CefrLevel::A2)
        .in_conversation("travel"),
        LearningItem::new(
            "b1_1",
            "Pourriez-vous me recommander un bon auteur ?",
            "Could you recommend a good author to me?",
            "library",
        )
        .with_pronunciation("poo-ryay voo muh ruh-koh-mahn-day uhn bohn oh-tuhr")
        .with_context("Conditional of politeness")
        .with_difficulty(Difficulty::Hard)
        .with_level(CefrLevel::B1),
    ]
}
