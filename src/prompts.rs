use crate::language::Language;
use crate::model::Task;

pub const INSTRUCTION_OPEN: &str = "<s>[INST] ";
pub const INSTRUCTION_CLOSE: &str = " [/INST]";

pub const GENERATE_REQUIREMENTS: &str = "\n\nPlease include:\n1. Proper error handling\n2. Type hints/documentation\n3. Best practices\n4. 3-5 meaningful test cases";

/// Appends the list of things every generated snippet should carry.
pub fn enhance_description(description: &str) -> String {
    format!("{description}{GENERATE_REQUIREMENTS}")
}

pub fn build_prompt(task: Task, input: &str, language: Language) -> String {
    let name = language.display_name();
    let instruction = match task {
        Task::Generate => format!(
            "Write a {name} {noun} that {input}. Include {requirements}. Ensure the code is complete and functional.",
            noun = language.routine_noun(),
            requirements = language.requirements(),
        ),
        Task::Debug => format!(
            "Debug and fix this {name} code. Explain the issues and provide a corrected version:\n\n{input}"
        ),
        Task::Explain => format!(
            "Explain this {name} code in detail, including its purpose, functionality, and any potential improvements:\n\n{input}"
        ),
    };
    format!("{INSTRUCTION_OPEN}{instruction}{INSTRUCTION_CLOSE}")
}
