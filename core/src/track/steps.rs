use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

pub const STEP_COUNT: u8 = 8;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StepDefinition {
    pub id: u8,
    pub name: String,
    pub path: String,
    pub prompt: String,
    pub verification: Vec<String>,
    pub break_tests: Vec<String>,
}

/// Where "next" goes from a given step: another numbered step, or the
/// terminal proof view after step 8.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StepAdvance {
    Step(u8),
    Proof,
}

pub fn next_target(current: u8) -> CoreResult<StepAdvance> {
    if !(1..=STEP_COUNT).contains(&current) {
        return Err(CoreError::UnknownStep(current));
    }
    if current == STEP_COUNT {
        Ok(StepAdvance::Proof)
    } else {
        Ok(StepAdvance::Step(current + 1))
    }
}

/// Previous from step 1 stays on step 1.
pub fn previous_target(current: u8) -> CoreResult<u8> {
    if !(1..=STEP_COUNT).contains(&current) {
        return Err(CoreError::UnknownStep(current));
    }
    Ok(if current == 1 { 1 } else { current - 1 })
}

pub fn validate_step_catalog(catalog: &[StepDefinition]) -> CoreResult<()> {
    if catalog.len() != STEP_COUNT as usize {
        return Err(CoreError::CatalogViolation(format!(
            "expected {} steps, found {}",
            STEP_COUNT,
            catalog.len()
        )));
    }
    for (idx, step) in catalog.iter().enumerate() {
        if step.id as usize != idx + 1 {
            return Err(CoreError::CatalogViolation(format!(
                "step ids must run 1..={} in order; position {} holds id {}",
                STEP_COUNT,
                idx,
                step.id
            )));
        }
    }
    Ok(())
}

/// The catalog with its contiguity invariant checked.
pub fn load_step_catalog() -> CoreResult<Vec<StepDefinition>> {
    let catalog = step_catalog();
    validate_step_catalog(&catalog)?;
    Ok(catalog)
}

pub fn step_by_id(catalog: &[StepDefinition], id: u8) -> CoreResult<&StepDefinition> {
    catalog
        .iter()
        .find(|step| step.id == id)
        .ok_or(CoreError::UnknownStep(id))
}

fn def(
    id: u8,
    name: &str,
    path: &str,
    prompt: &str,
    verification: &[&str],
    break_tests: &[&str],
) -> StepDefinition {
    StepDefinition {
        id,
        name: name.to_string(),
        path: path.to_string(),
        prompt: prompt.to_string(),
        verification: verification.iter().map(|s| s.to_string()).collect(),
        break_tests: break_tests.iter().map(|s| s.to_string()).collect(),
    }
}

/// The eight build-track phases. Fixed content, ordered by id.
pub fn step_catalog() -> Vec<StepDefinition> {
    vec![
        def(
            1,
            "Problem",
            "/rb/01-problem",
            "Create a problem statement and core value proposition for an AI Resume Builder. \
             Focus on ATS compatibility and keyword optimization.",
            &[
                "Is the problem statement clearly defined (ATS rejection)?",
                "Is the target audience identified (Job seekers)?",
                "Is the core value proposition unique (AI keyword optimization)?",
                "Does it address the specific pain point of formatting?",
                "Is the solution feasible within the scope?",
            ],
            &[
                "What if the user is in a creative field (non-ATS)?",
                "Does it handle different language/region standards?",
                "Why wouldn't a user just use ChatGPT directly?",
            ],
        ),
        def(
            2,
            "Market",
            "/rb/02-market",
            "Analyze the market for AI Resume Builders. Identify competitors, target \
             audience, and key differentiators.",
            &[
                "Are at least 3 direct competitors analyzed?",
                "Is the Total Addressable Market (TAM) estimated?",
                "Are key differentiators clearly listed?",
                "Is the pricing model aligned with the target audience?",
            ],
            &[
                "What if a major competitor releases a free version?",
                "Is the niche too small?",
            ],
        ),
        def(
            3,
            "Architecture",
            "/rb/03-architecture",
            "Design the system architecture. Define the frontend (React/Vite), backend \
             (Node/Python), and AI integration points.",
            &[
                "Is the tech stack clearly defined (React, Node, etc.)?",
                "Are the AI integration points (OpenAI/Gemini) identified?",
                "Is data flow between frontend and backend mapped?",
                "Are security considerations (PII) addressed?",
            ],
            &[
                "What happens if the AI API is down?",
                "How does it handle large concurrent users?",
            ],
        ),
        def(
            4,
            "HLD",
            "/rb/04-hld",
            "Create a High Level Design (HLD) document. Show component interactions, data \
             flow, and external services.",
            &[
                "Are all major system components represented?",
                "Are external system dependencies shown?",
                "Is the high-level data flow clear?",
                "Are storage solutions defined?",
            ],
            &[
                "Is the system scalable?",
                "Are there single points of failure?",
            ],
        ),
        def(
            5,
            "LLD",
            "/rb/05-lld",
            "Create a Low Level Design (LLD). Define API endpoints, database schema, and \
             class/component structures.",
            &[
                "Are API endpoints defined with methods and payloads?",
                "Is the database schema normalized?",
                "Are component prop types defined?",
                "Are error handling states mapped?",
            ],
            &[
                "Can the schema handle schema evolution?",
                "Are API rate limits considered?",
            ],
        ),
        def(
            6,
            "Build",
            "/rb/06-build",
            "Implement the core features. Build the resume editor, AI generation logic, and \
             export functionality.",
            &[
                "Does the application compile without errors?",
                "Can a user input resume data?",
                "Does the AI generation produce valid output?",
                "Is the export to PDF functional?",
            ],
            &[
                "What if the user inputs special characters?",
                "What if the network fails during generation?",
                "Does it work on mobile devices?",
            ],
        ),
        def(
            7,
            "Test",
            "/rb/07-test",
            "Develop a testing strategy. Write unit tests for utilities and integration \
             tests for the API.",
            &[
                "Are critical paths covered by unit tests?",
                "Do integration tests pass?",
                "Is test coverage above 70%?",
                "Are edge cases tested?",
            ],
            &[
                "Do mocks accurately reflect API behavior?",
                "Are race conditions tested?",
            ],
        ),
        def(
            8,
            "Ship",
            "/rb/08-ship",
            "Prepare for deployment. Validate environment variables, build scripts, and set \
             up CI/CD pipeline.",
            &[
                "Does the production build succeed?",
                "Are environment variables securely managed?",
                "Is the deployment pipeline configured?",
                "Is the live URL accessible?",
            ],
            &[
                "What if the deployment fails halfway?",
                "Is rollback strategy defined?",
            ],
        ),
    ]
}
