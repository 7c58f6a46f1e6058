//! Presentation tools

use super::args::{
    AddSlideArgs, CreatePresentationArgs, OpenPresentationArgs, PresentationRef,
    SavePresentationArgs, SetCorePropertiesArgs, SwitchPresentationArgs, TemplateArgs,
    TemplateInfoArgs,
};
use super::{display_path, object_with, ToolError, ToolSession};
use crate::document::{Document, Presentation, SlideSize};
use serde_json::{json, Value};
use tracing::info;

impl ToolSession {
    pub(super) fn create_presentation(
        &mut self,
        args: CreatePresentationArgs,
    ) -> Result<Value, ToolError> {
        let ratio = args.aspect_ratio.as_deref().unwrap_or("16:9");
        let (size, format_name) = SlideSize::for_aspect_ratio(ratio);
        let id = self.insert_presentation(args.id, Presentation::new(ratio));

        info!("Created presentation {} ({})", id, format_name);
        Ok(json!({
            "presentation_id": id,
            "message": format!("Created new presentation with ID: {}", id),
            "slide_count": 0,
            "aspect_ratio": format_name,
            "slide_width": size.width,
            "slide_height": size.height,
        }))
    }

    pub(super) async fn open_presentation(
        &mut self,
        args: OpenPresentationArgs,
    ) -> Result<Value, ToolError> {
        let path = self.sanitize(&args.file_path)?;
        let presentation = Presentation::open(&path).await?;
        let slide_count = presentation.slide_count();
        let id = self.insert_presentation(args.id, presentation);

        Ok(json!({
            "presentation_id": id,
            "message": format!("Opened presentation from {}", display_path(&path)),
            "slide_count": slide_count,
        }))
    }

    pub(super) async fn save_presentation(
        &mut self,
        args: SavePresentationArgs,
    ) -> Result<Value, ToolError> {
        let id = self.resolve_id(args.presentation_id.as_deref())?;
        let path = self.sanitize(&args.file_path)?;
        let presentation = self.presentation_ref(&id)?;
        let size_bytes = presentation.save(&path).await?;

        info!("Saved {} to {}", id, path.display());
        Ok(json!({
            "presentation_id": id,
            "file_path": display_path(&path),
            "size_bytes": size_bytes,
            "message": format!("Presentation saved to {}", display_path(&path)),
        }))
    }

    pub(super) async fn create_from_template(
        &mut self,
        args: TemplateArgs,
    ) -> Result<Value, ToolError> {
        let path = self.sanitize(&args.template_path)?;
        let presentation = Presentation::from_template(&path).await?;
        let slide_count = presentation.slide_count();
        let id = self.insert_presentation(args.id, presentation);

        Ok(json!({
            "presentation_id": id,
            "template_path": display_path(&path),
            "slide_count": slide_count,
            "message": format!("Created presentation {} from template", id),
        }))
    }

    pub(super) async fn get_template_info(
        &self,
        args: TemplateInfoArgs,
    ) -> Result<Value, ToolError> {
        let path = self.sanitize(&args.template_path)?;
        let info = Presentation::template_info(&path).await?;
        Ok(serde_json::to_value(info)?)
    }

    pub(super) fn get_presentation_info(&self, args: PresentationRef) -> Result<Value, ToolError> {
        let id = self.resolve_id(args.presentation_id.as_deref())?;
        let info = self.presentation_ref(&id)?.info();
        object_with(&info, json!({ "presentation_id": id }))
    }

    pub(super) fn set_core_properties(
        &mut self,
        args: SetCorePropertiesArgs,
    ) -> Result<Value, ToolError> {
        let id = self.resolve_id(args.presentation_id.as_deref())?;
        let presentation = self.presentation_mut(&id)?;
        presentation.set_core_properties(args.properties);

        Ok(json!({
            "presentation_id": id,
            "core_properties": presentation.core_properties(),
            "message": "Core properties updated successfully",
        }))
    }

    pub(super) fn add_slide(&mut self, args: AddSlideArgs) -> Result<Value, ToolError> {
        let id = self.resolve_id(args.presentation_id.as_deref())?;
        let presentation = self.presentation_mut(&id)?;
        let slide_index = presentation.add_slide(args.title, args.body);

        Ok(json!({
            "presentation_id": id,
            "slide_index": slide_index,
            "slide_count": presentation.slide_count(),
            "message": format!("Added slide {} to {}", slide_index, id),
        }))
    }

    pub(super) fn list_presentations(&self) -> Value {
        let presentations: Vec<Value> = self
            .presentations
            .iter()
            .map(|(id, presentation)| {
                json!({
                    "id": id,
                    "slide_count": presentation.slide_count(),
                    "is_current": self.current_id.as_deref() == Some(id.as_str()),
                })
            })
            .collect();

        json!({
            "presentations": presentations,
            "current_presentation_id": self.current_id,
            "total_presentations": self.presentations.len(),
        })
    }

    pub(super) fn switch_presentation(
        &mut self,
        args: SwitchPresentationArgs,
    ) -> Result<Value, ToolError> {
        if !self.presentations.contains_key(&args.presentation_id) {
            return Err(ToolError::PresentationNotFound(format!(
                "Presentation with ID '{}' not found",
                args.presentation_id
            )));
        }
        let previous = self.current_id.replace(args.presentation_id.clone());

        Ok(json!({
            "previous_presentation_id": previous,
            "presentation_id": args.presentation_id,
            "message": format!("Switched to presentation {}", args.presentation_id),
        }))
    }

    pub(super) fn presentation_ref(&self, id: &str) -> Result<&Presentation, ToolError> {
        self.presentations
            .get(id)
            .ok_or_else(|| {
                ToolError::PresentationNotFound(format!("Presentation with ID '{}' not found", id))
            })
    }

    pub(super) fn presentation_mut(&mut self, id: &str) -> Result<&mut Presentation, ToolError> {
        self.presentations
            .get_mut(id)
            .ok_or_else(|| {
                ToolError::PresentationNotFound(format!("Presentation with ID '{}' not found", id))
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::{PathPolicy, ToolSession};
    use crate::connections::ConnectionRegistry;
    use crate::transfer::ErrorKind;
    use serde_json::json;
    use tempfile::TempDir;

    fn session(dir: &TempDir) -> ToolSession {
        ToolSession::new(
            PathPolicy {
                base_dir: Some(dir.path().to_path_buf()),
                allow_absolute: false,
            },
            ConnectionRegistry::new(),
        )
    }

    #[tokio::test]
    async fn test_create_uses_aspect_ratio() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);

        let result = session
            .call_tool("create_presentation", json!({"aspect_ratio": "4:3", "id": "pitch"}))
            .await;
        assert_eq!(result["presentation_id"], "pitch");
        assert_eq!(result["aspect_ratio"], "Standard (4:3)");
        assert_eq!(session.current_id(), Some("pitch"));
    }

    #[tokio::test]
    async fn test_save_and_open_inside_base_dir() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);

        session.call_tool("create_presentation", json!({})).await;
        session
            .call_tool("add_slide", json!({"title": "Agenda", "body": ["Intro", "Plan"]}))
            .await;
        let saved = session
            .call_tool("save_presentation", json!({"file_path": "out/agenda.pptx"}))
            .await;
        assert!(saved.get("error").is_none(), "{}", saved);
        assert!(dir.path().join("out/agenda.pptx").exists());

        let opened = session
            .call_tool("open_presentation", json!({"file_path": "out/agenda.pptx", "id": "copy"}))
            .await;
        assert_eq!(opened["slide_count"], 1);

        let info = session
            .call_tool("get_presentation_info", json!({"presentation_id": "copy"}))
            .await;
        assert_eq!(info["slide_titles"], json!(["Agenda"]));
    }

    #[tokio::test]
    async fn test_save_rejects_traversal() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);

        session.call_tool("create_presentation", json!({})).await;
        let result = session
            .call_tool("save_presentation", json!({"file_path": "../../escape.pptx"}))
            .await;
        let message = result["error"].as_str().unwrap();
        assert!(message.contains("Path traversal detected"), "{}", message);
    }

    #[tokio::test]
    async fn test_save_without_presentation() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);

        let result = session
            .call_tool("save_presentation", json!({"file_path": "deck.pptx"}))
            .await;
        assert_eq!(
            result["error"],
            "No presentation is currently loaded or the specified ID is invalid"
        );
    }

    #[tokio::test]
    async fn test_template_requires_pptx_extension() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"hello").unwrap();
        let mut session = session(&dir);

        let result = session
            .call_tool("get_template_info", json!({"template_path": "notes.txt"}))
            .await;
        let message = result["error"].as_str().unwrap();
        assert!(message.starts_with("Failed to get template info"), "{}", message);
    }

    #[tokio::test]
    async fn test_core_properties_and_switch() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);

        session.call_tool("create_presentation", json!({"id": "a"})).await;
        session.call_tool("create_presentation", json!({"id": "b"})).await;

        let switched = session
            .call_tool("switch_presentation", json!({"presentation_id": "a"}))
            .await;
        assert_eq!(switched["previous_presentation_id"], "b");

        let updated = session
            .call_tool("set_core_properties", json!({"title": "Budget", "author": "Ops"}))
            .await;
        assert_eq!(updated["presentation_id"], "a");
        assert_eq!(updated["core_properties"]["title"], "Budget");

        let listed = session.call_tool("list_presentations", json!({})).await;
        assert_eq!(listed["total_presentations"], 2);
        assert_eq!(listed["current_presentation_id"], "a");

        let missing = session
            .call_tool("switch_presentation", json!({"presentation_id": "zzz"}))
            .await;
        assert_eq!(missing["error"], "Presentation with ID 'zzz' not found");
    }

    #[tokio::test]
    async fn test_path_error_kind() {
        let dir = TempDir::new().unwrap();
        let session = session(&dir);
        let err = session.sanitize("../../../../etc/passwd").unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::PathTraversal));
    }
}
