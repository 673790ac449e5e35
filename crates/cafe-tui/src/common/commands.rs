//! Prompt templates offered by the slash palette.
//!
//! Selecting a command replaces the composer text with its `prompt`.

/// Definition of a palette command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    /// Stable identifier, independent of display order.
    pub id: &'static str,
    pub title: &'static str,
    /// Short description shown in the palette row.
    pub description: &'static str,
    /// Expanded prompt written into the composer on selection.
    pub prompt: &'static str,
}

impl Command {
    /// Returns true if the title or id contains `filter` (case-insensitive).
    pub fn matches(&self, filter: &str) -> bool {
        let filter = filter.trim().to_lowercase();
        filter.is_empty()
            || self.title.to_lowercase().contains(&filter)
            || self.id.contains(&filter)
    }
}

/// Commands matching `filter`, in catalogue order.
pub fn filtered(filter: &str) -> Vec<&'static Command> {
    COMMANDS.iter().filter(|cmd| cmd.matches(filter)).collect()
}

pub fn find(id: &str) -> Option<&'static Command> {
    COMMANDS.iter().find(|cmd| cmd.id == id)
}

pub const COMMANDS: &[Command] = &[
    Command {
        id: "write-code",
        title: "Write Code",
        description: "Generate code for any language",
        prompt: "Write clean, well-documented code in the specified language. Include proper error handling, comments, and follow best practices for the chosen language and framework.",
    },
    Command {
        id: "debug-code",
        title: "Debug Code",
        description: "Find and fix bugs in your code",
        prompt: "Analyze the provided code to identify bugs, logical errors, and potential issues. Provide specific fixes with explanations and suggest improvements to prevent similar issues.",
    },
    Command {
        id: "explain-code",
        title: "Explain Code",
        description: "Get detailed explanations of code",
        prompt: "Break down the code line by line, explaining the purpose of each function, variable, and logic. Include context about design patterns, algorithms, and best practices used.",
    },
    Command {
        id: "optimize-code",
        title: "Optimize Code",
        description: "Improve performance and efficiency",
        prompt: "Analyze the code for performance bottlenecks, memory leaks, and inefficient algorithms. Provide optimized solutions with benchmarks and explanations of improvements.",
    },
    Command {
        id: "create-tests",
        title: "Create Tests",
        description: "Generate unit tests for your code",
        prompt: "Create comprehensive unit tests covering edge cases, error conditions, and normal operation. Include test descriptions, setup/teardown, and mock objects where appropriate.",
    },
    Command {
        id: "code-review",
        title: "Code Review",
        description: "Get feedback on your code quality",
        prompt: "Perform a thorough code review focusing on readability, maintainability, security, performance, and adherence to coding standards. Provide specific suggestions for improvement.",
    },
    Command {
        id: "refactor-code",
        title: "Refactor Code",
        description: "Restructure code for better maintainability",
        prompt: "Restructure the code to improve readability, reduce complexity, and enhance maintainability. Apply design patterns, extract methods, and improve naming conventions.",
    },
    Command {
        id: "add-comments",
        title: "Add Comments",
        description: "Add documentation and comments to code",
        prompt: "Add comprehensive comments and documentation explaining the purpose, parameters, return values, and usage examples for functions, classes, and complex logic.",
    },
    Command {
        id: "convert-language",
        title: "Convert Language",
        description: "Convert code between programming languages",
        prompt: "Convert the code to the target language while maintaining functionality, performance, and idiomatic patterns. Adapt libraries, syntax, and language-specific features appropriately.",
    },
    Command {
        id: "generate-api",
        title: "Generate API",
        description: "Create REST API endpoints and documentation",
        prompt: "Design and implement RESTful API endpoints with proper HTTP methods, status codes, request/response schemas, authentication, and comprehensive documentation including examples.",
    },
    Command {
        id: "database-query",
        title: "Database Query",
        description: "Write and optimize database queries",
        prompt: "Write efficient database queries with proper indexing, joins, and optimization techniques. Include query performance analysis and alternative approaches for complex operations.",
    },
    Command {
        id: "ui-component",
        title: "UI Component",
        description: "Create React/Vue/Angular components",
        prompt: "Create reusable UI components with proper props, state management, styling, accessibility features, and responsive design. Include TypeScript types and component documentation.",
    },
    Command {
        id: "mobile-app",
        title: "Mobile App",
        description: "Generate mobile app code and structure",
        prompt: "Create mobile app architecture with proper navigation, state management, API integration, offline capabilities, and platform-specific features for iOS/Android development.",
    },
    Command {
        id: "web-scraping",
        title: "Web Scraping",
        description: "Create web scraping scripts and bots",
        prompt: "Build web scraping solutions with proper rate limiting, error handling, data parsing, and respect for robots.txt. Include data storage, processing, and ethical scraping practices.",
    },
    Command {
        id: "data-analysis",
        title: "Data Analysis",
        description: "Analyze and visualize data with Python/R",
        prompt: "Perform comprehensive data analysis including data cleaning, statistical analysis, visualization, and insights generation. Use appropriate libraries and techniques for the data type and analysis goals.",
    },
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_catalogue_ids_are_unique() {
        let ids: HashSet<_> = COMMANDS.iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), COMMANDS.len());
        assert_eq!(COMMANDS.len(), 15);
    }

    #[test]
    fn test_empty_filter_lists_everything() {
        assert_eq!(filtered("").len(), COMMANDS.len());
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let hits: Vec<_> = filtered("CODE").iter().map(|c| c.id).collect();
        assert!(hits.contains(&"write-code"));
        assert!(hits.contains(&"code-review"));
        assert!(!hits.contains(&"mobile-app"));
    }

    #[test]
    fn test_find_by_id() {
        assert_eq!(find("explain-code").map(|c| c.title), Some("Explain Code"));
        assert!(find("nope").is_none());
    }
}
