//! Manuscript assembly from the structural order.

use super::characters::story_characters;
use super::helpers::load_story_events;
use super::ordering::structural_order;
use super::ownership::resolve;
use super::PlotStore;
use crate::error::StoreResult;
use plotline_export::{CastEntry, Manuscript, ManuscriptStyle};
use plotline_model::{Story, StoryId};
use tracing::info;

impl PlotStore {
    /// Build the manuscript of a story: its chained events' content in
    /// chain order, plus the cast for script style.
    pub fn manuscript(
        &self,
        username: &str,
        story_id: StoryId,
        style: ManuscriptStyle,
    ) -> StoreResult<Manuscript> {
        let conn = self.lock_conn();
        let story = resolve::<Story>(&conn, story_id, username)?;
        let events = load_story_events(&conn, story.id)?;
        let cast = match style {
            ManuscriptStyle::Script => story_characters(&conn, story.id)?
                .into_iter()
                .map(|c| CastEntry {
                    name: c.name,
                    short_description: c.short_description,
                })
                .collect(),
            ManuscriptStyle::Novella => Vec::new(),
        };
        drop(conn);

        let passages: Vec<String> = structural_order(events)?
            .into_iter()
            .filter_map(|e| e.content)
            .filter(|c| !c.trim().is_empty())
            .collect();

        info!(story_id = %story.id, passages = passages.len(), ?style, "Manuscript assembled");
        Ok(Manuscript {
            title: story.title,
            description: story.description,
            style,
            cast,
            passages,
        })
    }
}
