use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(clap::ValueEnum, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Java,
    C,
    Javascript,
    Typescript,
    Cpp,
    Csharp,
    Go,
    Rust,
    Ruby,
    Php,
    Swift,
    Kotlin,
    Scala,
    R,
}

// every language extracts from an include directive, C-family or not
const INCLUDE_MARKER: &str = "#include";

impl Language {
    pub const ALL: [Self; 15] = [
        Self::Python,
        Self::Java,
        Self::C,
        Self::Javascript,
        Self::Typescript,
        Self::Cpp,
        Self::Csharp,
        Self::Go,
        Self::Rust,
        Self::Ruby,
        Self::Php,
        Self::Swift,
        Self::Kotlin,
        Self::Scala,
        Self::R,
    ];

    /// Human readable name used inside prompts.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Python => "Python",
            Self::Java => "Java",
            Self::C => "C",
            Self::Javascript => "JavaScript",
            Self::Typescript => "TypeScript",
            Self::Cpp => "C++",
            Self::Csharp => "C#",
            Self::Go => "Go",
            Self::Rust => "Rust",
            Self::Ruby => "Ruby",
            Self::Php => "PHP",
            Self::Swift => "Swift",
            Self::Kotlin => "Kotlin",
            Self::Scala => "Scala",
            Self::R => "R",
        }
    }

    /// Identifier used on the command line, in config files and share links.
    pub const fn id(self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::Java => "java",
            Self::C => "c",
            Self::Javascript => "javascript",
            Self::Typescript => "typescript",
            Self::Cpp => "cpp",
            Self::Csharp => "csharp",
            Self::Go => "go",
            Self::Rust => "rust",
            Self::Ruby => "ruby",
            Self::Php => "php",
            Self::Swift => "swift",
            Self::Kotlin => "kotlin",
            Self::Scala => "scala",
            Self::R => "r",
        }
    }

    /// Info string for markdown code fences.
    pub const fn fence_tag(self) -> &'static str {
        match self {
            Self::Javascript => "js",
            Self::Typescript => "ts",
            _ => self.id(),
        }
    }

    pub(crate) const fn routine_noun(self) -> &'static str {
        match self {
            Self::Java => "method",
            _ => "function",
        }
    }

    pub(crate) const fn requirements(self) -> &'static str {
        match self {
            Self::Python => "proper error handling, type hints, and docstrings",
            Self::C => "proper error handling, memory management, and documentation",
            _ => "proper error handling, documentation, and best practices",
        }
    }

    /// Line prefixes that mark the start of source code in an unfenced response.
    pub fn markers(self) -> Vec<&'static str> {
        let own: &[&'static str] = match self {
            Self::Java | Self::Kotlin | Self::Scala | Self::Go => &["package "],
            Self::Php => &["<?php"],
            Self::Csharp => &["using System"],
            Self::Rust => &["use std::", "#!["],
            Self::Python => &["#!/usr/bin/env python"],
            _ => &[],
        };
        std::iter::once(INCLUDE_MARKER)
            .chain(own.iter().copied())
            .collect()
    }

    pub fn next(self) -> Self {
        let position = Self::ALL
            .iter()
            .position(|language| *language == self)
            .unwrap_or_default();
        Self::ALL[(position + 1) % Self::ALL.len()]
    }
}

impl Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Language {
    type Err = crate::GenieError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|language| language.id() == needle || language.display_name().to_lowercase() == needle)
            .ok_or_else(|| crate::GenieError::Validation(format!("unsupported language: {s}")))
    }
}
