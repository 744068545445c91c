use crate::extract::extract_code;
use crate::language::Language;
use crate::model::{CodeDraft, CodeResult, Task, Transport};
use crate::prompts::{build_prompt, enhance_description};
use crate::{GenieError, Result};

/// Turns generate/debug/explain requests into calls to a [`Transport`].
///
/// Generate and debug run as two strictly ordered steps: [`Self::draft`]
/// produces code, then [`Self::annotate`] explains that code. A failure in
/// either step fails the whole request.
pub struct Orchestrator<T> {
    transport: T,
}

fn require_input(input: &str, task: Task) -> Result<()> {
    if input.trim().is_empty() {
        let message = match task {
            Task::Generate => "Please enter a description of the code you want to generate.",
            Task::Debug => "Please enter code to debug.",
            Task::Explain => "Please enter code to explain.",
        };
        return Err(GenieError::Validation(message.to_string()));
    }
    Ok(())
}

impl<T: Transport> Orchestrator<T> {
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    pub const fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn run(&self, task: Task, input: &str, language: Language) -> Result<CodeResult> {
        match task {
            Task::Generate => self.generate(input, language).await,
            Task::Debug => self.debug(input, language).await,
            Task::Explain => self.explain(input, language).await,
        }
    }

    pub async fn generate(&self, description: &str, language: Language) -> Result<CodeResult> {
        require_input(description, Task::Generate)?;
        tracing::info!(%language, "generating code");
        let draft = self.draft(Task::Generate, description, language).await?;
        self.annotate(draft).await
    }

    pub async fn debug(&self, code: &str, language: Language) -> Result<CodeResult> {
        require_input(code, Task::Debug)?;
        tracing::info!(%language, "debugging code");
        let draft = self.draft(Task::Debug, code, language).await?;
        self.annotate(draft).await
    }

    /// The input code is returned unchanged next to its explanation.
    pub async fn explain(&self, code: &str, language: Language) -> Result<CodeResult> {
        require_input(code, Task::Explain)?;
        tracing::info!(%language, "explaining code");
        let explanation = self.describe(code, language).await?;
        Ok(CodeResult {
            code: code.to_string(),
            explanation,
        })
    }

    /// First step of generate/debug: ask for code and extract it from the answer.
    pub async fn draft(&self, task: Task, input: &str, language: Language) -> Result<CodeDraft> {
        require_input(input, task)?;
        let prompt = match task {
            Task::Generate => build_prompt(task, &enhance_description(input), language),
            Task::Debug => build_prompt(task, input, language),
            Task::Explain => {
                return Err(GenieError::Validation(
                    "explain requests do not produce code".to_string(),
                ))
            }
        };
        let raw = self.call(&prompt).await?;
        let code = extract_code(&raw, language);
        if code.is_empty() {
            return Err(GenieError::EmptyExtraction);
        }
        tracing::debug!(%task, code_len = code.len(), "draft ready");
        Ok(CodeDraft { language, code })
    }

    /// Second step of generate/debug: explain the drafted code.
    pub async fn annotate(&self, draft: CodeDraft) -> Result<CodeResult> {
        let explanation = self.describe(&draft.code, draft.language).await?;
        Ok(CodeResult {
            code: draft.code,
            explanation,
        })
    }

    async fn describe(&self, code: &str, language: Language) -> Result<String> {
        let prompt = build_prompt(Task::Explain, code, language);
        // explanations are used as returned, no extraction
        self.call(&prompt).await
    }

    async fn call(&self, prompt: &str) -> Result<String> {
        let raw = self.transport.complete(prompt).await?;
        if raw.trim().is_empty() {
            return Err(GenieError::EmptyGeneration);
        }
        Ok(raw)
    }
}
