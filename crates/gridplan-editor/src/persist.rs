//! JSON scene files.

use std::path::Path;

use gridplan_core::scene::{SCENE_VERSION, SceneSnapshot};
use gridplan_spatial::LoadSummary;

use crate::editor::Editor;
use crate::error::EditorError;

/// Encode a scene as pretty-printed JSON.
pub fn scene_to_json(scene: &SceneSnapshot) -> Result<String, EditorError> {
    serde_json::to_string_pretty(scene).map_err(|e| EditorError::Serialization {
        detail: e.to_string(),
    })
}

/// Decode a scene. `origin` names the source in errors.
pub fn scene_from_json(json: &str, origin: &Path) -> Result<SceneSnapshot, EditorError> {
    let scene: SceneSnapshot = serde_json::from_str(json).map_err(|e| EditorError::Parse {
        file: origin.to_path_buf(),
        detail: e.to_string(),
    })?;
    if scene.version == 0 || scene.version > SCENE_VERSION {
        return Err(EditorError::Parse {
            file: origin.to_path_buf(),
            detail: format!("unsupported scene version {}", scene.version),
        });
    }
    Ok(scene)
}

pub fn save_scene(path: &Path, scene: &SceneSnapshot) -> Result<(), EditorError> {
    let json = scene_to_json(scene)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn load_scene(path: &Path) -> Result<SceneSnapshot, EditorError> {
    let content = std::fs::read_to_string(path)?;
    scene_from_json(&content, path)
}

impl Editor {
    /// Write the current layout to `path`.
    pub fn save(&self, path: &Path) -> Result<(), EditorError> {
        save_scene(path, &self.snapshot())
    }

    /// Replace the current layout with the scene stored at `path`. On error
    /// the editor is left untouched.
    pub fn open(&mut self, path: &Path) -> Result<LoadSummary, EditorError> {
        let scene = load_scene(path)?;
        Ok(self.load(scene))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::editor::Tool;
    use gridplan_core::catalog::DeviceKind;
    use gridplan_core::test_utils::pos;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("gridplan-{}-{name}", std::process::id()))
    }

    #[test]
    fn json_uses_editor_field_names() {
        let mut editor = Editor::new(EditorConfig::default());
        editor.set_tool(Tool::Device(DeviceKind::PowerStation));
        editor.click(pos(1, 2)).unwrap();

        let json = scene_to_json(&editor.snapshot()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["gridCols"], 70);
        assert_eq!(value["devices"][0]["kind"], "power_station");
        assert_eq!(value["devices"][0]["rotation"], 0);
        assert!(value["pipelineCells"].as_array().unwrap().is_empty());
    }

    #[test]
    fn missing_version_is_a_parse_error() {
        let json = r#"{ "gridCols": 10, "gridRows": 10, "devices": [], "pipelineCells": [], "pipelineElements": [] }"#;
        let err = scene_from_json(json, Path::new("scene.json")).unwrap_err();
        assert!(matches!(err, EditorError::Parse { .. }));
    }

    #[test]
    fn future_version_is_rejected() {
        let json = r#"{ "version": 9, "gridCols": 10, "gridRows": 10, "devices": [], "pipelineCells": [], "pipelineElements": [] }"#;
        let err = scene_from_json(json, Path::new("scene.json")).unwrap_err();
        assert!(err.to_string().contains("unsupported scene version 9"));
    }

    #[test]
    fn save_then_open() {
        let path = temp_path("save_then_open.json");
        let mut editor = Editor::new(EditorConfig::default());
        editor.set_tool(Tool::Device(DeviceKind::Refinery));
        editor.click(pos(3, 3)).unwrap();
        editor.save(&path).unwrap();

        let mut other = Editor::new(EditorConfig::default());
        let summary = other.open(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(summary.report.devices, 1);
        assert_eq!(other.snapshot(), editor.snapshot());
        assert!(other.layout().is_index_current());
    }

    #[test]
    fn open_failure_leaves_editor_untouched() {
        let path = temp_path("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        let mut editor = Editor::new(EditorConfig::default());
        editor.set_tool(Tool::Device(DeviceKind::Crusher));
        editor.click(pos(0, 0)).unwrap();
        let before = editor.snapshot();

        let err = editor.open(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(err, EditorError::Parse { ref file, .. } if *file == path));
        assert_eq!(editor.snapshot(), before);
    }

    #[test]
    fn open_missing_file_is_io_error() {
        let mut editor = Editor::new(EditorConfig::default());
        let err = editor.open(Path::new("/nonexistent/gridplan/scene.json")).unwrap_err();
        assert!(matches!(err, EditorError::Io(_)));
    }
}
