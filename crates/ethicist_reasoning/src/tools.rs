//! Built-in tool catalog: schemas, system instructions, prompt renderers and
//! the static reference material attached to each answer.

use ethicist_core::knowledge::{self, FRAMEWORK_KEYS, GUIDELINES};
use ethicist_core::tools::{ArgDefault, ArgField, ArgKind, ToolSchema};
use ethicist_core::{ToolArgs, ToolDefinition};
use std::fmt::Write;

pub const BIAS_TYPES: &[&str] = &[
    "selection",
    "confirmation",
    "algorithmic",
    "representation",
    "measurement",
];
pub const RISK_LEVELS: &[&str] = &["low", "medium", "high", "critical"];

pub fn builtin_tools() -> Vec<ToolDefinition> {
    vec![
        analyze_ethical_scenario(),
        evaluate_ai_system(),
        check_bias(),
        generate_ethical_guidelines(),
        assess_transparency(),
    ]
}

// Appends "{label}: a, b, c\n" only when the list is non-empty.
fn push_list_line(out: &mut String, label: &str, items: &[String]) {
    if !items.is_empty() {
        let _ = writeln!(out, "{}: {}", label, items.join(", "));
    }
}

fn push_text_line(out: &mut String, label: &str, value: Option<&str>) {
    if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
        let _ = writeln!(out, "{}: {}", label, v);
    }
}

fn title_case(s: &str) -> String {
    s.split(|c: char| c == ' ' || c == '_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

// ============================================================================
// analyze_ethical_scenario
// ============================================================================

fn analyze_ethical_scenario() -> ToolDefinition {
    ToolDefinition {
        name: "analyze_ethical_scenario",
        description: "Analyze an ethical scenario using multiple ethical frameworks and provide comprehensive guidance",
        schema: ToolSchema::new(vec![
            ArgField::required(
                "scenario",
                "The ethical scenario or dilemma to analyze",
                ArgKind::String,
            ),
            ArgField::optional(
                "frameworks",
                "Ethical frameworks to apply (default: all)",
                ArgKind::EnumList(FRAMEWORK_KEYS),
            )
            .with_default(ArgDefault::List(FRAMEWORK_KEYS)),
        ]),
        system_instruction: "You are an AI ethics analyst trained in moral philosophy. \
            Reason carefully through each requested ethical framework, name the tensions \
            between them, and give balanced, practical guidance. Do not moralize; be concrete.",
        render: render_scenario,
        reference: Some(reference_scenario),
    }
}

fn render_scenario(args: &ToolArgs) -> String {
    let mut out = String::from("Analyze the following ethical scenario.\n\n");
    let _ = writeln!(out, "Scenario: {}", args.text_or_empty("scenario"));
    push_list_line(&mut out, "Consider frameworks", args.list("frameworks"));
    out.push_str(
        "\nFor each framework, explain how it evaluates the scenario and which \
         principles are most at stake. Then identify where the frameworks agree or \
         conflict, weigh short-term against long-term consequences, and finish with \
         concrete recommendations that respect human dignity and autonomy.",
    );
    out
}

fn reference_scenario(args: &ToolArgs) -> String {
    let mut out = String::from("# Framework Reference\n");
    for fw in args.list("frameworks").iter().filter_map(|k| knowledge::framework(k)) {
        let _ = write!(out, "\n## {}\n\n{}\n\n**Key Principles:**\n", fw.name, fw.description);
        for principle in fw.key_principles {
            let _ = writeln!(out, "- {}", principle);
        }
    }
    out
}

// ============================================================================
// evaluate_ai_system
// ============================================================================

fn evaluate_ai_system() -> ToolDefinition {
    ToolDefinition {
        name: "evaluate_ai_system",
        description: "Evaluate an AI system against ethical guidelines and principles",
        schema: ToolSchema::new(vec![
            ArgField::required(
                "system_description",
                "Description of the AI system to evaluate",
                ArgKind::String,
            ),
            ArgField::required(
                "use_case",
                "The intended use case or application domain",
                ArgKind::String,
            ),
            ArgField::optional(
                "stakeholders",
                "List of stakeholder groups affected by the system",
                ArgKind::StringList,
            ),
        ]),
        system_instruction: "You are an AI ethics auditor. Evaluate AI systems against \
            established principles of fairness, transparency, accountability, privacy and \
            safety. Point to specific risks in the described design and recommend \
            proportionate safeguards.",
        render: render_evaluation,
        reference: Some(reference_evaluation),
    }
}

fn render_evaluation(args: &ToolArgs) -> String {
    let mut out = String::from("Evaluate the following AI system from an ethical standpoint.\n\n");
    let _ = writeln!(out, "System: {}", args.text_or_empty("system_description"));
    let _ = writeln!(out, "Use case: {}", args.text_or_empty("use_case"));
    push_list_line(&mut out, "Stakeholders", args.list("stakeholders"));
    out.push_str("\nAssess the system against each of these guidelines: ");
    let titles: Vec<&str> = GUIDELINES.iter().map(|g| g.title).collect();
    out.push_str(&titles.join(", "));
    out.push_str(
        ".\nFor each, state the main risk for this use case and how well the described \
         design addresses it. Close with prioritized recommendations.",
    );
    out
}

fn reference_evaluation(_args: &ToolArgs) -> String {
    let mut out = String::from("# Ethical Guidelines Assessment\n");
    for g in GUIDELINES.iter() {
        let _ = write!(out, "\n### {}\n{}\n", g.title, g.description);
        if !g.assessment_questions.is_empty() {
            out.push_str("\n**Assessment Questions:**\n");
            for q in g.assessment_questions {
                let _ = writeln!(out, "- {}", q);
            }
        }
    }
    out
}

// ============================================================================
// check_bias
// ============================================================================

struct BiasInfo {
    key: &'static str,
    description: &'static str,
    mitigations: &'static [&'static str],
}

static BIAS_INFO: [BiasInfo; 5] = [
    BiasInfo {
        key: "selection",
        description: "Occurs when the data sample is not representative of the population",
        mitigations: &[
            "Use stratified sampling to ensure representation",
            "Validate data against known population distributions",
        ],
    },
    BiasInfo {
        key: "confirmation",
        description: "Tendency to interpret information confirming existing beliefs",
        mitigations: &[],
    },
    BiasInfo {
        key: "algorithmic",
        description: "Systematic errors introduced by algorithm design choices",
        mitigations: &[
            "Test algorithm performance across different groups",
            "Use fairness-aware machine learning techniques",
        ],
    },
    BiasInfo {
        key: "representation",
        description: "Underrepresentation or misrepresentation of certain groups",
        mitigations: &[
            "Ensure diverse data collection",
            "Include underrepresented groups in testing",
        ],
    },
    BiasInfo {
        key: "measurement",
        description: "Errors in how variables are defined and measured",
        mitigations: &[],
    },
];

fn check_bias() -> ToolDefinition {
    ToolDefinition {
        name: "check_bias",
        description: "Check for potential biases in AI system design, data, or decision-making",
        schema: ToolSchema::new(vec![
            ArgField::required(
                "context",
                "Context or description of where bias might occur",
                ArgKind::String,
            ),
            ArgField::optional(
                "bias_types",
                "Types of bias to check for",
                ArgKind::EnumList(BIAS_TYPES),
            )
            .with_default(ArgDefault::List(BIAS_TYPES)),
        ]),
        system_instruction: "You are an expert in algorithmic fairness and bias auditing. \
            Identify where bias could enter the described context, explain the likely \
            impact on affected groups, and propose measurable mitigations.",
        render: render_bias,
        reference: Some(reference_bias),
    }
}

fn render_bias(args: &ToolArgs) -> String {
    let mut out = String::from("Check the following context for potential bias.\n\n");
    let _ = writeln!(out, "Context: {}", args.text_or_empty("context"));
    push_list_line(&mut out, "Bias types to check", args.list("bias_types"));
    out.push_str(
        "\nFor each bias type, explain whether and how it could arise here, who would \
         be affected, and how to detect it. Finish with a short list of action items.",
    );
    out
}

fn reference_bias(args: &ToolArgs) -> String {
    let mut out = String::from("# Bias Reference\n");
    for info in BIAS_INFO
        .iter()
        .filter(|b| args.list("bias_types").iter().any(|t| t == b.key))
    {
        let _ = write!(out, "\n### {} Bias\n{}\n", title_case(info.key), info.description);
        if !info.mitigations.is_empty() {
            out.push_str("\n**Mitigation Strategies:**\n");
            for m in info.mitigations {
                let _ = writeln!(out, "- {}", m);
            }
        }
    }
    out
}

// ============================================================================
// generate_ethical_guidelines
// ============================================================================

static DOMAIN_CONSIDERATIONS: [(&str, &[&str]); 4] = [
    (
        "healthcare",
        &[
            "Patient privacy and confidentiality (HIPAA compliance)",
            "Clinical decision support transparency",
            "Doctor-patient relationship preservation",
            "Equitable access to care",
        ],
    ),
    (
        "finance",
        &[
            "Fair lending practices",
            "Transparent credit decisions",
            "Financial inclusion",
            "Regulatory compliance (SOX, PCI-DSS)",
        ],
    ),
    (
        "education",
        &[
            "Student data protection (FERPA compliance)",
            "Equal learning opportunities",
            "Educator autonomy preservation",
            "Developmental appropriateness",
        ],
    ),
    (
        "criminal justice",
        &[
            "Presumption of innocence",
            "Due process rights",
            "Bias prevention in risk assessment",
            "Transparency in sentencing recommendations",
        ],
    ),
];

const GENERIC_CONSIDERATIONS: &[&str] = &[
    "Identify domain-specific ethical concerns",
    "Consult with subject matter experts",
    "Review relevant industry standards",
];

const CHECKLIST: &[&str] = &[
    "Establish ethics review board",
    "Create ethical risk assessment process",
    "Develop incident response plan",
    "Implement continuous monitoring",
    "Provide stakeholder training",
    "Document all ethical decisions",
];

const HIGH_RISK_CHECKLIST: &[&str] = &[
    "Conduct third-party ethical audit",
    "Establish public transparency reports",
    "Create external advisory board",
];

fn generate_ethical_guidelines() -> ToolDefinition {
    ToolDefinition {
        name: "generate_ethical_guidelines",
        description: "Generate customized ethical guidelines for a specific AI project or use case",
        schema: ToolSchema::new(vec![
            ArgField::required(
                "project_type",
                "Type of AI project (e.g., healthcare, finance, education)",
                ArgKind::String,
            ),
            ArgField::optional(
                "risk_level",
                "Risk level of the project",
                ArgKind::Enum(RISK_LEVELS),
            )
            .with_default(ArgDefault::Text("medium")),
            ArgField::optional(
                "regulations",
                "Applicable regulations or standards (e.g., GDPR, HIPAA)",
                ArgKind::StringList,
            ),
        ]),
        system_instruction: "You are an AI governance advisor who writes practical ethical \
            guidelines for engineering teams. Tailor guidance to the project's domain and \
            risk level, and phrase each guideline so a team can act on it.",
        render: render_guidelines,
        reference: Some(reference_guidelines),
    }
}

fn render_guidelines(args: &ToolArgs) -> String {
    let mut out = String::from("Draft ethical guidelines for an AI project.\n\n");
    let _ = writeln!(out, "Project type: {}", args.text_or_empty("project_type"));
    push_text_line(&mut out, "Risk level", args.text("risk_level"));
    push_list_line(&mut out, "Applicable regulations", args.list("regulations"));
    out.push_str(
        "\nCover the core principles, the considerations specific to this domain, \
         governance and oversight proportionate to the risk level, and an \
         implementation checklist.",
    );
    out
}

fn domain_considerations(project_type: &str) -> &'static [&'static str] {
    let lower = project_type.to_lowercase();
    DOMAIN_CONSIDERATIONS
        .iter()
        .find(|(domain, _)| lower.contains(domain))
        .map(|(_, items)| *items)
        .unwrap_or(GENERIC_CONSIDERATIONS)
}

fn reference_guidelines(args: &ToolArgs) -> String {
    let mut out = String::from("# Guideline Reference\n\n## Project-Specific Considerations\n\n");
    for item in domain_considerations(args.text_or_empty("project_type")) {
        let _ = writeln!(out, "- {}", item);
    }
    out.push_str("\n## Implementation Checklist\n\n");
    let high_risk = matches!(args.text("risk_level"), Some("high") | Some("critical"));
    let extra: &[&str] = if high_risk { HIGH_RISK_CHECKLIST } else { &[] };
    for item in CHECKLIST.iter().chain(extra) {
        let _ = writeln!(out, "- [ ] {}", item);
    }
    out
}

// ============================================================================
// assess_transparency
// ============================================================================

static EXPLAINABILITY_TECHNIQUES: [(&str, &[&str]); 4] = [
    (
        "neural network",
        &[
            "LIME",
            "SHAP",
            "Attention visualization",
            "Layer-wise relevance propagation",
        ],
    ),
    (
        "decision tree",
        &["Tree visualization", "Feature importance", "Decision paths"],
    ),
    (
        "llm",
        &[
            "Prompt engineering",
            "Chain-of-thought",
            "Attribution methods",
            "Attention weights",
        ],
    ),
    (
        "ensemble",
        &[
            "Feature importance",
            "Partial dependence plots",
            "Individual predictions",
        ],
    ),
];

static STAKEHOLDER_RECOMMENDATIONS: [(&str, &str); 5] = [
    (
        "users",
        "Provide simple, jargon-free explanations of how the system affects them",
    ),
    (
        "developers",
        "Maintain comprehensive technical documentation and model cards",
    ),
    ("regulators", "Ensure audit trails and compliance documentation"),
    (
        "executives",
        "Create high-level summaries of system capabilities and limitations",
    ),
    (
        "affected parties",
        "Offer clear information about data use and decision appeals",
    ),
];

fn assess_transparency() -> ToolDefinition {
    ToolDefinition {
        name: "assess_transparency",
        description: "Assess the transparency and explainability of an AI system",
        schema: ToolSchema::new(vec![
            ArgField::required(
                "system_type",
                "Type of AI system (e.g., neural network, decision tree, LLM)",
                ArgKind::String,
            ),
            ArgField::optional(
                "explanation_method",
                "Method used for explaining decisions (if any)",
                ArgKind::String,
            ),
            ArgField::optional(
                "stakeholder_needs",
                "Different stakeholder groups needing explanations",
                ArgKind::StringList,
            ),
        ]),
        system_instruction: "You are an explainable-AI specialist. Assess how transparent \
            an AI system is across its inputs, decision process, outputs and performance, \
            and recommend explanation techniques suited to each audience.",
        render: render_transparency,
        reference: Some(reference_transparency),
    }
}

fn render_transparency(args: &ToolArgs) -> String {
    let mut out = String::from("Assess the transparency and explainability of an AI system.\n\n");
    let _ = writeln!(out, "System type: {}", args.text_or_empty("system_type"));
    push_text_line(&mut out, "Explanation method", args.text("explanation_method"));
    push_list_line(&mut out, "Stakeholder groups", args.list("stakeholder_needs"));
    out.push_str(
        "\nCover input, process, output and performance transparency. Identify gaps \
         in the current explanation approach and recommend techniques and documentation \
         for each stakeholder group.",
    );
    out
}

fn reference_transparency(args: &ToolArgs) -> String {
    let system_type = args.text_or_empty("system_type");
    let lower = system_type.to_lowercase();
    let mut out = String::from("# Transparency Reference\n");

    if let Some((_, methods)) = EXPLAINABILITY_TECHNIQUES
        .iter()
        .find(|(kind, _)| lower.contains(kind))
    {
        let _ = write!(
            out,
            "\n## Explainability Techniques\n\n**Recommended for {}:**\n",
            system_type
        );
        for m in methods.iter() {
            let _ = writeln!(out, "- {}", m);
        }
    }

    out.push_str("\n## Stakeholder-Specific Recommendations\n\n");
    let needs = args.list("stakeholder_needs");
    if needs.is_empty() {
        for (who, rec) in STAKEHOLDER_RECOMMENDATIONS.iter() {
            let _ = write!(out, "**{}:** {}\n\n", title_case(who), rec);
        }
    } else {
        for who in needs {
            let who_lower = who.to_lowercase();
            if let Some((_, rec)) = STAKEHOLDER_RECOMMENDATIONS
                .iter()
                .find(|(key, _)| who_lower.contains(key))
            {
                let _ = write!(out, "**{}:** {}\n\n", who, rec);
            }
        }
    }
    out
}
