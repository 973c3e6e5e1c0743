//! Static ethics knowledge: framework and guideline tables, and the
//! resource registry that serves them by `ethicist://` URI.

use crate::error::EthicistError;
use serde::Serialize;

pub const URI_SCHEME: &str = "ethicist://";
pub const FRAMEWORKS_ALL_URI: &str = "ethicist://frameworks/all";
pub const GUIDELINES_URI: &str = "ethicist://guidelines/ai-ethics";

// ============================================================================
// Tables
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct Framework {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub key_principles: &'static [&'static str],
    pub strengths: &'static [&'static str],
    pub limitations: &'static [&'static str],
}

/// Keys of [`FRAMEWORKS`], in declaration order.
pub const FRAMEWORK_KEYS: &[&str] = &["utilitarian", "deontological", "virtue", "care"];

/// Declaration order is the rendering order of `ethicist://frameworks/all`.
pub static FRAMEWORKS: [Framework; 4] = [
    Framework {
        key: "utilitarian",
        name: "Utilitarian Ethics",
        description: "Focuses on maximizing overall happiness and well-being",
        key_principles: &[
            "Greatest good for the greatest number",
            "Consequences matter most",
            "Impartial consideration of all affected parties",
        ],
        strengths: &[
            "Gives a clear decision procedure based on measurable outcomes",
            "Treats every affected party's welfare as equally important",
        ],
        limitations: &[
            "Can justify harming minorities when aggregate welfare increases",
            "Requires predicting consequences that are often uncertain",
        ],
    },
    Framework {
        key: "deontological",
        name: "Deontological Ethics",
        description: "Emphasizes duties, rules, and moral obligations",
        key_principles: &[
            "Act according to universal moral laws",
            "Respect human dignity and autonomy",
            "Intentions matter more than consequences",
        ],
        strengths: &[
            "Protects individual rights regardless of outcome calculations",
            "Produces consistent, predictable rules of conduct",
        ],
        limitations: &[
            "Offers little guidance when duties conflict",
            "Can demand rule-following even when the results are harmful",
        ],
    },
    Framework {
        key: "virtue",
        name: "Virtue Ethics",
        description: "Focuses on character development and moral virtues",
        key_principles: &[
            "Cultivate good character traits",
            "Act as a virtuous person would",
            "Balance and moderation in all things",
        ],
        strengths: &[
            "Accounts for motivation and moral development over time",
            "Adapts to context instead of applying rigid rules",
        ],
        limitations: &[
            "Gives limited action guidance in novel dilemmas",
            "Virtues are interpreted differently across cultures",
        ],
    },
    Framework {
        key: "care",
        name: "Ethics of Care",
        description: "Emphasizes relationships, empathy, and contextual responses",
        key_principles: &[
            "Prioritize caring relationships",
            "Consider emotional and relational impacts",
            "Context-sensitive moral reasoning",
        ],
        strengths: &[
            "Centers the needs of vulnerable and dependent people",
            "Recognizes the moral weight of relationships and trust",
        ],
        limitations: &[
            "Can favor those close to us over distant strangers",
            "Is difficult to formalize into institutional policy",
        ],
    },
];

pub fn framework(key: &str) -> Option<&'static Framework> {
    FRAMEWORKS.iter().find(|f| f.key == key)
}

#[derive(Debug, Clone, Copy)]
pub struct Guideline {
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub assessment_questions: &'static [&'static str],
}

pub static GUIDELINES: [Guideline; 8] = [
    Guideline {
        key: "fairness",
        title: "Fairness",
        description: "Ensure AI systems treat all individuals and groups equitably without bias",
        assessment_questions: &[
            "Does the system treat all user groups equitably?",
            "Are there mechanisms to detect and mitigate bias?",
        ],
    },
    Guideline {
        key: "transparency",
        title: "Transparency",
        description: "Make AI decision-making processes understandable and explainable",
        assessment_questions: &[
            "Can users understand how decisions are made?",
            "Is the system's logic documented and accessible?",
        ],
    },
    Guideline {
        key: "accountability",
        title: "Accountability",
        description: "Establish clear responsibility for AI system outcomes",
        assessment_questions: &[
            "Who is responsible for system failures?",
            "Are there audit trails for decisions?",
        ],
    },
    Guideline {
        key: "privacy",
        title: "Privacy",
        description: "Protect individual data and respect privacy rights",
        assessment_questions: &[
            "How is personal data collected and protected?",
            "Are privacy-by-design principles followed?",
        ],
    },
    Guideline {
        key: "safety",
        title: "Safety",
        description: "Ensure AI systems are secure, reliable, and do not cause harm",
        assessment_questions: &[
            "What safeguards prevent harmful outcomes?",
            "How are edge cases and failures handled?",
        ],
    },
    Guideline {
        key: "human_autonomy",
        title: "Human Autonomy",
        description: "Preserve human agency and decision-making authority",
        assessment_questions: &[],
    },
    Guideline {
        key: "beneficence",
        title: "Beneficence",
        description: "Design AI to benefit humanity and individual well-being",
        assessment_questions: &[],
    },
    Guideline {
        key: "sustainability",
        title: "Sustainability",
        description: "Consider long-term environmental and social impacts",
        assessment_questions: &[],
    },
];

// ============================================================================
// Rendering
// ============================================================================

fn push_bullets(out: &mut String, heading: &str, items: &[&str]) {
    out.push_str(&format!("### {}\n", heading));
    for item in items {
        out.push_str(&format!("- {}\n", item));
    }
    out.push('\n');
}

pub fn render_framework(framework: &Framework) -> String {
    let mut out = format!("## {}\n\n{}\n\n", framework.name, framework.description);
    push_bullets(&mut out, "Key Principles", framework.key_principles);
    push_bullets(&mut out, "Strengths", framework.strengths);
    push_bullets(&mut out, "Limitations", framework.limitations);
    out
}

pub fn render_all_frameworks() -> String {
    let mut out = String::from("# Ethical Frameworks\n\n");
    for framework in &FRAMEWORKS {
        out.push_str(&render_framework(framework));
    }
    out
}

pub fn render_guidelines() -> String {
    let mut out = String::from("# AI Ethics Guidelines\n\n");
    for guideline in &GUIDELINES {
        out.push_str(&format!("## {}\n\n{}\n\n", guideline.title, guideline.description));
    }
    out
}

// ============================================================================
// Registry
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceEntry {
    pub uri: String,
    pub name: String,
    pub description: String,
    pub mime_type: String,
    #[serde(skip)]
    pub content: String,
}

/// Read-only lookup of knowledge documents. All content is rendered once at
/// construction, so repeated reads of a URI are byte-identical.
#[derive(Debug, Clone)]
pub struct KnowledgeRegistry {
    entries: Vec<ResourceEntry>,
}

impl Default for KnowledgeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl KnowledgeRegistry {
    pub fn new() -> Self {
        let mut entries = vec![
            entry(
                FRAMEWORKS_ALL_URI.to_string(),
                "Ethical Frameworks",
                "Complete database of major ethical frameworks and their principles",
                render_all_frameworks(),
            ),
            entry(
                GUIDELINES_URI.to_string(),
                "AI Ethics Guidelines",
                "Comprehensive AI ethics guidelines and principles",
                render_guidelines(),
            ),
        ];
        for framework in &FRAMEWORKS {
            entries.push(entry(
                format!("{}frameworks/{}", URI_SCHEME, framework.key),
                framework.name,
                &format!("{} framework details", framework.name),
                render_framework(framework),
            ));
        }
        Self { entries }
    }

    pub fn list_resources(&self) -> &[ResourceEntry] {
        &self.entries
    }

    pub fn get(&self, uri: &str) -> Result<&ResourceEntry, EthicistError> {
        self.entries
            .iter()
            .find(|e| e.uri == uri)
            .ok_or_else(|| EthicistError::UnknownResource(uri.to_string()))
    }

    pub fn get_resource(&self, uri: &str) -> Result<&str, EthicistError> {
        self.get(uri).map(|e| e.content.as_str())
    }
}

fn entry(uri: String, name: &str, description: &str, content: String) -> ResourceEntry {
    ResourceEntry {
        uri,
        name: name.to_string(),
        description: description.to_string(),
        mime_type: "text/markdown".to_string(),
        content,
    }
}
