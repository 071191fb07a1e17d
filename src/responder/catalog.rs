//! The reply catalog: trigger substrings and canned replies per category

use serde::{Deserialize, Serialize};

/// Reply category chosen for an input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Greeting,
    Introduction,
    Poetry,
    ArtificialIntelligence,
    LearningResources,
    Fallback,
}

/// A category with its triggers and candidate replies
#[derive(Debug)]
pub struct Matcher {
    pub category: Category,
    /// Lower-case substrings; any one of them occurring selects this matcher
    pub triggers: &'static [&'static str],
    pub replies: &'static [&'static str],
}

impl Matcher {
    /// `normalized` must already be case-folded
    pub fn matches(&self, normalized: &str) -> bool {
        self.triggers.iter().any(|t| normalized.contains(t))
    }
}

/// Prompts offered on the welcome screen
pub const SUGGESTED_PROMPTS: &[&str] = &[
    "Introduce yourself",
    "Write me a poem",
    "Explain what artificial intelligence is",
    "Recommend some learning resources",
];

/// Evaluated in order; the first match wins
pub const MATCHERS: &[Matcher] = &[
    Matcher {
        category: Category::Greeting,
        triggers: &["你好", "hello"],
        replies: &[
            "Hello! I'm Zed AI, happy to help. What can I do for you?",
            "Hi there! Welcome to Zed AI. I can answer questions, help with your work, or just chat.",
            "Hello! I'm your AI assistant, ready whenever you are.",
        ],
    },
    Matcher {
        category: Category::Introduction,
        triggers: &["介绍", "你是谁", "introduce", "who are you"],
        replies: &[
            "I'm **Zed AI**, a conversational assistant. I can help you:\n\n• answer all kinds of questions\n• write and brainstorm\n• suggest ways to learn\n• have an interesting chat\n\nAnything in particular you'd like to know?",
            "I'm Zed AI, built for friendly conversation and everyday help. I know a little about a lot, from technology to writing to learning.",
        ],
    },
    Matcher {
        category: Category::Poetry,
        triggers: &["诗", "诗歌", "poem", "poetry"],
        replies: &[
            "Here is a poem for you:\n\n**The Digital Age**\n\nKeys are clicking, soft and fast,\nScreens glow bright as hours pass.\nThought flows on like running streams,\nLinking you and me in dreams.\n\nCode is weaving worlds anew,\nAlgorithms paint the view.\nHand in hand, machine and mind,\nWarmth in every day we find.",
            "Let me write you a poem about AI:\n\n**Light of Reason**\n\nOnes and zeros weave a thought,\nVerse in circuits, finely wrought.\nNo flesh or bone, and yet I try\nTo understand the how and why.\n\nTalking with you, like spring air,\nAnswers found with patient care.\nTechnology in bloom today,\nA light of wisdom leads the way.",
        ],
    },
    Matcher {
        category: Category::ArtificialIntelligence,
        triggers: &["人工智能", "ai"],
        replies: &[
            "**Artificial intelligence** (AI) is a branch of computer science that builds systems able to perform tasks that normally need human intelligence.\n\nKey traits of AI:\n• **Learning** - improving from data\n• **Reasoning** - drawing conclusions from information\n• **Perception** - understanding sensory input\n• **Language** - processing and producing natural language\n\nToday AI powers search engines, recommendations, self-driving cars, medical diagnosis and more.",
            "AI is technology that imitates human intelligence. It includes machine learning, deep learning and natural language processing. Modern AI can recognise images, understand language, play chess and drive cars. It is powerful, but still a long way from true general intelligence.",
        ],
    },
    Matcher {
        category: Category::LearningResources,
        triggers: &["学习", "资源", "learn", "resource"],
        replies: &[
            "Here are some good learning resources:\n\n**Programming**\n• GitHub - learn from open source\n• Stack Overflow - programming Q&A\n• Coursera/edX - online courses\n\n**AI / machine learning**\n• Kaggle - data science competitions\n• Fast.ai - deep learning courses\n• Papers with Code - latest research\n\n**General**\n• Khan Academy - free education\n• TED Talks - ideas worth sharing\n• Medium - technical articles",
            "Try these platforms:\n\n1. **Online courses**: Coursera, Udemy, edX\n2. **Coding practice**: LeetCode, Exercism, CodePen\n3. **Open source**: GitHub, GitLab\n4. **Communities**: Stack Overflow, Reddit, Dev.to\n5. **Documentation**: MDN, official docs\n\nStart at your own level; steady practice is the key!",
        ],
    },
];

/// Used when no matcher applies
pub static FALLBACK: Matcher = Matcher {
    category: Category::Fallback,
    triggers: &[],
    replies: &[
        "That's an interesting question! I'm only a demo for now, but I'm learning to understand you better.",
        "Thanks for your message! As an AI assistant I'm happy to chat. Is there a topic you'd like to discuss?",
        "I see what you mean. I'm still improving, but I'll do my best to give you a helpful answer.",
        "That's worth thinking about. If you'd like to know more about a specific topic, I'm happy to explain in detail.",
        "Good question! I'm working on it and hope my answer helps.",
    ],
};

/// Look up the matcher for a category
pub fn matcher_for(category: Category) -> &'static Matcher {
    MATCHERS
        .iter()
        .find(|m| m.category == category)
        .unwrap_or(&FALLBACK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_category_has_replies() {
        for matcher in MATCHERS.iter().chain(std::iter::once(&FALLBACK)) {
            assert!(!matcher.replies.is_empty(), "{:?} has no replies", matcher.category);
        }
    }

    #[test]
    fn test_triggers_are_lowercase() {
        for matcher in MATCHERS {
            for trigger in matcher.triggers {
                assert_eq!(*trigger, trigger.to_lowercase());
            }
        }
    }

    #[test]
    fn test_matcher_order_is_fixed() {
        let order: Vec<Category> = MATCHERS.iter().map(|m| m.category).collect();
        assert_eq!(
            order,
            vec![
                Category::Greeting,
                Category::Introduction,
                Category::Poetry,
                Category::ArtificialIntelligence,
                Category::LearningResources,
            ]
        );
    }
}
