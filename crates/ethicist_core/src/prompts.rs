//! Guided-reasoning prompt templates, rendered with caller-supplied variables.

use crate::error::EthicistError;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize)]
pub struct PromptArgument {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
}

/// Variables after required-argument checks and optional defaults.
pub struct PromptVars<'a> {
    values: &'a HashMap<String, String>,
}

impl<'a> PromptVars<'a> {
    fn get(&self, name: &str) -> Option<&'a str> {
        self.values.get(name).map(String::as_str)
    }

    fn get_or(&self, name: &str, default: &'a str) -> &'a str {
        self.get(name).filter(|v| !v.trim().is_empty()).unwrap_or(default)
    }
}

#[derive(Clone)]
pub struct PromptDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub arguments: &'static [PromptArgument],
    /// Short description attached to the rendered result.
    pub result_description: &'static str,
    render: fn(&PromptVars<'_>) -> String,
}

impl PromptDefinition {
    pub fn required_arguments(&self) -> Vec<&'static str> {
        self.arguments
            .iter()
            .filter(|a| a.required)
            .map(|a| a.name)
            .collect()
    }
}

impl std::fmt::Debug for PromptDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptDefinition")
            .field("name", &self.name)
            .field("arguments", &self.arguments)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPrompt {
    pub description: String,
    pub text: String,
}

// ============================================================================
// Templates
// ============================================================================

fn render_decision_making(vars: &PromptVars<'_>) -> String {
    let situation = vars.get("situation").unwrap_or_default();
    format!(
        "I need help thinking through an ethical decision: {situation}

Please help me analyze this using a structured approach:

1. **Clarify the Situation**
   - What are the key facts?
   - What is the core ethical question?
   - What is at stake?

2. **Identify Stakeholders**
   - Who will be affected by this decision?
   - What are their interests and concerns?
   - Who has power and who is vulnerable?

3. **Consider Multiple Perspectives**
   - Utilitarian: What produces the greatest good?
   - Deontological: What are my duties and obligations?
   - Virtue Ethics: What would a person of good character do?
   - Care Ethics: How can I maintain relationships and care for those affected?

4. **Evaluate Options**
   - What are the possible courses of action?
   - What are the likely consequences of each?
   - Which aligns best with ethical principles?

5. **Make a Decision**
   - What is the most ethical choice?
   - How will I implement it?
   - How will I monitor the outcome?

Please guide me through this process."
    )
}

fn render_stakeholder_analysis(vars: &PromptVars<'_>) -> String {
    let decision = vars.get("decision").unwrap_or_default();
    format!(
        "I need to analyze stakeholders for: {decision}

Help me identify and analyze all stakeholders:

1. **Direct Stakeholders** (immediately affected)
   - Who benefits directly from this decision?
   - Who might be harmed directly?
   - What are their rights and interests?

2. **Indirect Stakeholders** (secondarily affected)
   - Who else might be impacted?
   - What are the ripple effects?
   - Are there future generations to consider?

3. **Power Analysis**
   - Who has decision-making power?
   - Who is vulnerable or powerless?
   - How can we ensure fair representation?

4. **Stakeholder Engagement**
   - Who should be consulted?
   - How can we gather their input?
   - How do we balance competing interests?

5. **Equity Considerations**
   - Are any groups disproportionately affected?
   - How can we ensure fairness?
   - What are the implications for social justice?

Please help me work through each of these areas."
    )
}

fn render_risk_assessment(vars: &PromptVars<'_>) -> String {
    let system = vars.get("system_description").unwrap_or_default();
    let context = vars.get_or("deployment_context", "various contexts");
    format!(
        "I need to assess ethical risks for: {system}
Deployment context: {context}

Please help me evaluate:

1. **Fairness Risks**
   - Could the system discriminate against protected groups?
   - Is the training data representative?
   - Are there historical biases to consider?
   - How will we measure and ensure fairness?

2. **Transparency Risks**
   - Can users understand how decisions are made?
   - Is the system's logic explainable?
   - Are there \"black box\" concerns?
   - What documentation is needed?

3. **Privacy Risks**
   - What personal data is collected?
   - How is data protected?
   - Are privacy regulations followed?
   - Could data be misused?

4. **Safety and Security Risks**
   - What could go wrong?
   - How are errors handled?
   - Could the system be manipulated?
   - What are the failure modes?

5. **Autonomy and Control Risks**
   - Does the system preserve human agency?
   - Can decisions be appealed?
   - Is there appropriate human oversight?
   - Could it create dependency?

6. **Social Impact Risks**
   - How might this affect employment?
   - Could it increase inequality?
   - What are the environmental impacts?
   - Are there unintended consequences?

Please help me assess each risk category and recommend mitigations."
    )
}

fn builtin_prompts() -> Vec<PromptDefinition> {
    vec![
        PromptDefinition {
            name: "ethical_decision_making",
            description: "Guide users through a structured ethical decision-making process",
            arguments: &[PromptArgument {
                name: "situation",
                description: "The ethical situation or decision to be made",
                required: true,
            }],
            result_description: "Structured ethical decision-making process",
            render: render_decision_making,
        },
        PromptDefinition {
            name: "stakeholder_analysis",
            description: "Help analyze and consider all stakeholders affected by a decision",
            arguments: &[PromptArgument {
                name: "decision",
                description: "The decision or action being considered",
                required: true,
            }],
            result_description: "Comprehensive stakeholder analysis",
            render: render_stakeholder_analysis,
        },
        PromptDefinition {
            name: "ai_risk_assessment",
            description: "Assess potential ethical risks of an AI system",
            arguments: &[
                PromptArgument {
                    name: "system_description",
                    description: "Description of the AI system",
                    required: true,
                },
                PromptArgument {
                    name: "deployment_context",
                    description: "Where and how the system will be deployed",
                    required: false,
                },
            ],
            result_description: "AI ethical risk assessment",
            render: render_risk_assessment,
        },
    ]
}

// ============================================================================
// Registry
// ============================================================================

#[derive(Debug, Clone)]
pub struct PromptRegistry {
    prompts: Vec<PromptDefinition>,
}

impl Default for PromptRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptRegistry {
    pub fn new() -> Self {
        Self {
            prompts: builtin_prompts(),
        }
    }

    pub fn list_prompts(&self) -> &[PromptDefinition] {
        &self.prompts
    }

    pub fn get_prompt(
        &self,
        name: &str,
        arguments: &HashMap<String, String>,
    ) -> Result<RenderedPrompt, EthicistError> {
        let prompt = self
            .prompts
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| EthicistError::UnknownPrompt(name.to_string()))?;

        for arg in prompt.arguments.iter().filter(|a| a.required) {
            match arguments.get(arg.name) {
                Some(v) if !v.trim().is_empty() => {}
                Some(_) => {
                    return Err(EthicistError::invalid_argument(arg.name, "must not be empty"))
                }
                None => {
                    return Err(EthicistError::invalid_argument(
                        arg.name,
                        "missing required argument",
                    ))
                }
            }
        }

        let vars = PromptVars { values: arguments };
        Ok(RenderedPrompt {
            description: prompt.result_description.to_string(),
            text: (prompt.render)(&vars),
        })
    }
}
