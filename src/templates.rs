pub struct Template {
    pub name: &'static str,
    pub description: &'static str,
    pub content: &'static str,
}

pub const TEMPLATES: &[Template] = &[
    Template {
        name: "wastevision",
        description: "One environment per model family (YOLO, ViT, SSD, Fast R-CNN)",
        content: WASTEVISION,
    },
    Template {
        name: "single",
        description: "A single environment for the whole project",
        content: SINGLE,
    },
];

pub fn find(name: &str) -> Option<&'static Template> {
    TEMPLATES.iter().find(|t| t.name == name)
}

pub fn names() -> String {
    TEMPLATES.iter().map(|t| t.name).collect::<Vec<_>>().join(", ")
}

pub const WASTEVISION: &str = r#"
venv_name = "wv-venv"
workon_home = "venvs"
manifest = "requirements.txt"
bootstrap_packages = ["wheel", "tomli"]
custom_venvs = "custom_venvs.txt"

directories = [
    "generate_input",
    "generate_output",
    "generate_output/logs",
    "models",
    "training_output",
    "dataset/train",
    "dataset/valid",
    "dataset/test",
]

[[environments]]
name = "yolo"
python = "3.11"
entry = "scripts.models.yolov8.main"

[[environments]]
name = "vit"

[[environments]]
name = "ssd"

[[environments]]
name = "fast-rcc"

[clean]
dir_names = ["__pycache__", ".ipynb_checkpoints"]
file_patterns = ["*.pyc", "*.pyo", ".vscode/*.cache"]
purge = ["training_output"]
"#;

pub const SINGLE: &str = r#"
venv_name = "venv"
workon_home = "."
manifest = "requirements.txt"

directories = ["models", "dataset/train", "dataset/valid", "dataset/test"]

[[environments]]
name = "main"
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn every_template_parses_and_validates() {
        for template in TEMPLATES {
            let cfg: Config = toml::from_str(template.content)
                .unwrap_or_else(|e| panic!("template {} is invalid: {e}", template.name));
            cfg.validate().unwrap();
        }
    }

    #[test]
    fn lookup_by_name() {
        assert!(find("single").is_some());
        assert!(find("django").is_none());
        assert_eq!(names(), "wastevision, single");
    }
}
