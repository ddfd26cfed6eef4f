// localchat — A terminal chat interface for local and remote language models
// Copyright (C) 2025  Simon Peter Rothgang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use super::gate::{EngineSnapshot, GenerationGate};
use super::rows::{ListBody, build_rows};
use super::scroll::{AutoScroll, ScrollMetrics, ScrollSignature};
use crate::conversation::{Conversation, Message};

/// The only configuration the viewport accepts from its host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewportProps {
    pub is_loading: bool,
    pub is_generating: bool,
}

/// Everything needed to draw one frame of the viewport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewportFrame<'a> {
    pub body: ListBody<'a>,
    pub gate: GenerationGate,
    /// Settled scroll offset, in rows from the top of the content.
    pub offset: usize,
    pub show_scroll_to_bottom: bool,
}

/// Composes the gate, the row builder and the scroll controller.
#[derive(Debug, Default)]
pub struct Viewport {
    scroll: AutoScroll,
}

impl Viewport {
    #[must_use]
    pub fn new(threshold: usize) -> Self {
        Self { scroll: AutoScroll::new(threshold) }
    }

    pub fn scroll(&self) -> &AutoScroll {
        &self.scroll
    }

    pub fn is_at_bottom(&self) -> bool {
        self.scroll.is_at_bottom()
    }

    /// Feed the settled conversation state for this update cycle.
    pub fn sync(&mut self, conversation: Option<&Conversation>, props: ViewportProps) {
        let messages: &[Message] = conversation.map(|c| c.messages.as_slice()).unwrap_or_default();
        self.scroll.observe(ScrollSignature::capture(
            conversation.map(|c| &c.id),
            messages,
            props.is_generating,
        ));
    }

    /// Build the frame. `measure` lays the body out and reports its height;
    /// returning `None` means the region could not be measured this frame.
    pub fn render_pass<'a, F>(
        &mut self,
        conversation: Option<&'a Conversation>,
        props: ViewportProps,
        engine: EngineSnapshot,
        measure: F,
    ) -> ViewportFrame<'a>
    where
        F: FnOnce(&ListBody<'a>) -> Option<ScrollMetrics>,
    {
        let gate = GenerationGate::derive(engine, props.is_generating);
        let messages: &'a [Message] =
            conversation.map(|c| c.messages.as_slice()).unwrap_or_default();
        let title = conversation.map(|c| c.title.as_str());
        let body = build_rows(messages, gate, props.is_loading, title);
        let outcome = self.scroll.settle(measure(&body));
        ViewportFrame {
            body,
            gate,
            offset: outcome.offset,
            show_scroll_to_bottom: !outcome.is_at_bottom,
        }
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll.scroll_to_bottom();
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll.scroll_to_top();
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll.scroll_up(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll.scroll_down(lines);
    }

    pub fn page_up(&mut self) {
        self.scroll.page_up();
    }

    pub fn page_down(&mut self) {
        self.scroll.page_down();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Role;
    use crate::engine::EngineStatus;
    use crate::viewport::rows::RowDescriptor;
    use pretty_assertions::assert_eq;

    const READY: EngineSnapshot = EngineSnapshot { status: EngineStatus::Ready, is_loading: false };
    const VIEWPORT: usize = 10;

    /// One row per message line plus a label row.
    fn measure(body: &ListBody<'_>) -> Option<ScrollMetrics> {
        let content_height = match body {
            ListBody::Rows(rows) => {
                rows.iter().map(|r| r.message.content.lines().count() + 1).sum()
            }
            ListBody::Placeholder(_) => 3,
            ListBody::Blank => 0,
        };
        Some(ScrollMetrics { content_height, viewport_height: VIEWPORT })
    }

    fn conversation(turns: &[(Role, &str)]) -> Conversation {
        let mut conv = Conversation::new("test");
        conv.messages = turns.iter().map(|(role, text)| Message::new(*role, *text)).collect();
        conv
    }

    fn frame<'a>(
        viewport: &mut Viewport,
        conv: &'a Conversation,
        props: ViewportProps,
    ) -> ViewportFrame<'a> {
        viewport.sync(Some(conv), props);
        viewport.render_pass(Some(conv), props, READY, measure)
    }

    fn affordances(rows: &[RowDescriptor<'_>]) -> Vec<(bool, bool)> {
        rows.iter().map(|r| (r.can_regenerate(), r.can_stop())).collect()
    }

    #[test]
    fn idle_three_turns_offer_regenerate_on_last() {
        let conv =
            conversation(&[(Role::User, "q"), (Role::Assistant, "a"), (Role::Assistant, "b")]);
        let mut viewport = Viewport::default();
        let out = frame(&mut viewport, &conv, ViewportProps::default());
        assert_eq!(
            affordances(out.body.rows()),
            vec![(false, false), (false, false), (true, false)]
        );
    }

    #[test]
    fn generating_three_turns_offer_stop_on_last() {
        let conv =
            conversation(&[(Role::User, "q"), (Role::Assistant, "a"), (Role::Assistant, "b")]);
        let mut viewport = Viewport::default();
        let props = ViewportProps { is_loading: false, is_generating: true };
        let out = frame(&mut viewport, &conv, props);
        assert_eq!(
            affordances(out.body.rows()),
            vec![(false, false), (false, false), (false, true)]
        );
    }

    #[test]
    fn empty_conversation_shows_placeholder_without_scroll_control() {
        let conv = conversation(&[]);
        let mut viewport = Viewport::default();
        let out = frame(&mut viewport, &conv, ViewportProps::default());
        assert!(matches!(out.body, ListBody::Placeholder(_)));
        assert!(out.body.rows().is_empty());
        assert!(!out.show_scroll_to_bottom);
    }

    #[test]
    fn engine_loading_disables_regenerate() {
        let conv = conversation(&[(Role::User, "q"), (Role::Assistant, "a")]);
        let mut viewport = Viewport::default();
        let props = ViewportProps::default();
        viewport.sync(Some(&conv), props);
        let loading = EngineSnapshot { status: EngineStatus::Ready, is_loading: true };
        let out = viewport.render_pass(Some(&conv), props, loading, measure);
        assert_eq!(affordances(out.body.rows()), vec![(false, false), (false, false)]);
    }

    #[test]
    fn scrolled_up_view_keeps_control_while_streaming() {
        let long = "row\n".repeat(300);
        let mut conv = conversation(&[(Role::User, "q"), (Role::Assistant, long.as_str())]);
        let props = ViewportProps { is_loading: false, is_generating: true };
        let mut viewport = Viewport::default();
        let first = frame(&mut viewport, &conv, props);
        assert!(!first.show_scroll_to_bottom);

        viewport.scroll_up(200);
        let parked = viewport.scroll().offset();
        conv.messages[1].content.push_str(&"y".repeat(50));
        let out = frame(&mut viewport, &conv, props);
        assert_eq!(out.offset, parked);
        assert!(out.show_scroll_to_bottom);
    }

    #[test]
    fn scroll_to_bottom_hides_control() {
        let long = "row\n".repeat(50);
        let conv = conversation(&[(Role::Assistant, long.as_str())]);
        let mut viewport = Viewport::default();
        frame(&mut viewport, &conv, ViewportProps::default());
        viewport.scroll_to_top();
        assert!(frame(&mut viewport, &conv, ViewportProps::default()).show_scroll_to_bottom);
        viewport.scroll_to_bottom();
        assert!(!frame(&mut viewport, &conv, ViewportProps::default()).show_scroll_to_bottom);
    }

    #[test]
    fn switching_conversation_resets_to_bottom() {
        let long = "row\n".repeat(50);
        let a = conversation(&[(Role::Assistant, long.as_str())]);
        let b = conversation(&[(Role::Assistant, long.as_str())]);
        let mut viewport = Viewport::default();
        frame(&mut viewport, &a, ViewportProps::default());
        viewport.scroll_to_top();
        assert!(!viewport.is_at_bottom());

        viewport.sync(Some(&b), ViewportProps::default());
        assert!(viewport.is_at_bottom());
        let out = viewport.render_pass(Some(&b), ViewportProps::default(), READY, measure);
        assert_eq!(out.offset, 51 - VIEWPORT);
    }

    #[test]
    fn unmeasurable_region_keeps_previous_offset() {
        let long = "row\n".repeat(50);
        let conv = conversation(&[(Role::Assistant, long.as_str())]);
        let mut viewport = Viewport::default();
        let first = frame(&mut viewport, &conv, ViewportProps::default());
        viewport.sync(Some(&conv), ViewportProps::default());
        let out = viewport.render_pass(Some(&conv), ViewportProps::default(), READY, |_| None);
        assert_eq!(out.offset, first.offset);
    }
}
