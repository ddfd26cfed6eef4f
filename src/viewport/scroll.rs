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

//! Bottom-pinning scroll controller for the conversation viewport.
//!
//! The controller is the only writer of the viewport scroll offset. It is
//! driven in two steps per frame: [`AutoScroll::observe`] records the settled
//! conversation state (any number of calls, last one wins) and
//! [`AutoScroll::settle`] measures once and makes the single scroll decision
//! for that frame. Streaming tokens applied between two frames therefore
//! collapse into one decision.

use crate::conversation::{ConversationId, Message, MessageId};

/// Rows from the bottom that still count as "at bottom".
pub const DEFAULT_BOTTOM_THRESHOLD: usize = 1;

/// Measured size of the scrollable region, in rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollMetrics {
    pub content_height: usize,
    pub viewport_height: usize,
}

impl ScrollMetrics {
    #[must_use]
    pub fn max_offset(self) -> usize {
        self.content_height.saturating_sub(self.viewport_height)
    }
}

/// Fingerprint of the inputs that can move the bottom of the viewport.
/// Streaming only ever grows the tail message, so its length is enough
/// to notice an append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollSignature {
    conversation: Option<ConversationId>,
    message_count: usize,
    tail: Option<(MessageId, usize)>,
    is_generating: bool,
}

impl ScrollSignature {
    #[must_use]
    pub fn capture(
        conversation: Option<&ConversationId>,
        messages: &[Message],
        is_generating: bool,
    ) -> Self {
        Self {
            conversation: conversation.cloned(),
            message_count: messages.len(),
            tail: messages.last().map(|m| (m.id.clone(), m.content.len())),
            is_generating,
        }
    }

    fn is_empty(&self) -> bool {
        self.message_count == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewportState {
    pub is_at_bottom: bool,
    /// Signature of the last frame that was successfully measured.
    pub last_measured: Option<ScrollSignature>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleOutcome {
    pub offset: usize,
    pub is_at_bottom: bool,
    /// The offset moved during this settle.
    pub scrolled: bool,
}

#[derive(Debug)]
pub struct AutoScroll {
    threshold: usize,
    offset: usize,
    is_at_bottom: bool,
    observed: Option<ScrollSignature>,
    measured: Option<ScrollSignature>,
    metrics: Option<ScrollMetrics>,
    /// Pin to the bottom on the next successful settle regardless of state.
    follow: bool,
}

impl Default for AutoScroll {
    fn default() -> Self {
        Self::new(DEFAULT_BOTTOM_THRESHOLD)
    }
}

impl AutoScroll {
    #[must_use]
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold,
            offset: 0,
            is_at_bottom: true,
            observed: None,
            measured: None,
            metrics: None,
            follow: true,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_at_bottom(&self) -> bool {
        self.is_at_bottom
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn state(&self) -> ViewportState {
        ViewportState { is_at_bottom: self.is_at_bottom, last_measured: self.measured.clone() }
    }

    /// Record the settled conversation state for the coming frame.
    ///
    /// A change of conversation identity resets the controller to "at bottom"
    /// before anything of the new conversation has been measured.
    pub fn observe(&mut self, signature: ScrollSignature) {
        let switched =
            self.observed.as_ref().is_none_or(|prev| prev.conversation != signature.conversation);
        if switched {
            tracing::debug!(
                conversation = ?signature.conversation.as_ref().map(ConversationId::as_str),
                "viewport conversation switched; pinning to bottom"
            );
            self.offset = 0;
            self.is_at_bottom = true;
            self.measured = None;
            self.metrics = None;
            self.follow = true;
        }
        self.observed = Some(signature);
    }

    /// Measure and decide. `None` means the region could not be measured
    /// (e.g. zero-sized); nothing moves and the decision is retried next frame.
    pub fn settle(&mut self, metrics: Option<ScrollMetrics>) -> SettleOutcome {
        let before = self.offset;
        let Some(metrics) = metrics else {
            tracing::trace!("viewport not measurable; deferring scroll decision");
            return self.outcome(false);
        };

        let max = metrics.max_offset();
        if self.observed.as_ref().is_some_and(ScrollSignature::is_empty) {
            self.offset = 0;
            self.is_at_bottom = true;
        } else {
            let content_changed = self.observed != self.measured;
            let resized = self.metrics != Some(metrics);
            if self.follow || (self.is_at_bottom && (content_changed || resized)) {
                self.offset = max;
            }
            self.offset = self.offset.min(max);
            self.is_at_bottom = max - self.offset <= self.threshold;
        }

        self.follow = false;
        self.metrics = Some(metrics);
        self.measured.clone_from(&self.observed);

        let scrolled = self.offset != before;
        if scrolled {
            tracing::trace!(from = before, to = self.offset, max, "viewport scrolled");
        }
        self.outcome(scrolled)
    }

    /// Jump to the newest content and stay pinned there.
    pub fn scroll_to_bottom(&mut self) {
        self.follow = true;
        if let Some(metrics) = self.metrics {
            self.offset = metrics.max_offset();
            self.is_at_bottom = true;
        }
    }

    pub fn scroll_to_top(&mut self) {
        self.follow = false;
        self.offset = 0;
        self.reclassify();
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.follow = false;
        self.offset = self.offset.saturating_sub(lines);
        self.reclassify();
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.offset = self.offset.saturating_add(lines);
        self.reclassify();
    }

    pub fn page_up(&mut self) {
        self.scroll_up(self.page_size());
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.page_size());
    }

    fn page_size(&self) -> usize {
        self.metrics.map_or(1, |m| m.viewport_height.saturating_sub(1).max(1))
    }

    /// Re-derive `is_at_bottom` from the offset against the last measurement.
    fn reclassify(&mut self) {
        let Some(metrics) = self.metrics else {
            return;
        };
        let max = metrics.max_offset();
        self.offset = self.offset.min(max);
        self.is_at_bottom = max - self.offset <= self.threshold;
    }

    fn outcome(&self, scrolled: bool) -> SettleOutcome {
        SettleOutcome { offset: self.offset, is_at_bottom: self.is_at_bottom, scrolled }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Role;
    use pretty_assertions::assert_eq;

    const VIEWPORT: usize = 20;

    struct Harness {
        scroll: AutoScroll,
        conversation: ConversationId,
        messages: Vec<Message>,
        generating: bool,
    }

    impl Harness {
        fn new(message_count: usize) -> Self {
            let messages = (0..message_count)
                .map(|i| {
                    let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
                    Message::new(role, "line\n".repeat(10))
                })
                .collect();
            Self {
                scroll: AutoScroll::default(),
                conversation: ConversationId::from("c1"),
                messages,
                generating: false,
            }
        }

        /// Each newline-terminated line is one row.
        fn content_height(&self) -> usize {
            self.messages.iter().map(|m| m.content.lines().count()).sum()
        }

        fn metrics(&self) -> ScrollMetrics {
            ScrollMetrics { content_height: self.content_height(), viewport_height: VIEWPORT }
        }

        fn frame(&mut self) -> SettleOutcome {
            self.scroll.observe(ScrollSignature::capture(
                Some(&self.conversation),
                &self.messages,
                self.generating,
            ));
            let metrics = self.metrics();
            self.scroll.settle(Some(metrics))
        }

        fn append_to_tail(&mut self, text: &str) {
            if let Some(last) = self.messages.last_mut() {
                last.content.push_str(text);
            }
        }

        fn bottom(&self) -> usize {
            self.metrics().max_offset()
        }
    }

    #[test]
    fn first_frame_pins_to_bottom() {
        let mut h = Harness::new(6);
        let outcome = h.frame();
        assert_eq!(outcome.offset, h.bottom());
        assert!(outcome.is_at_bottom);
    }

    #[test]
    fn streaming_appends_keep_a_pinned_view_at_bottom() {
        let mut h = Harness::new(6);
        h.generating = true;
        h.frame();
        for _ in 0..25 {
            h.append_to_tail("token token\n");
            let outcome = h.frame();
            assert_eq!(outcome.offset, h.bottom());
            assert!(outcome.is_at_bottom);
        }
    }

    #[test]
    fn new_message_keeps_a_pinned_view_at_bottom() {
        let mut h = Harness::new(4);
        h.frame();
        h.messages.push(Message::new(Role::User, "more\n".repeat(8)));
        assert_eq!(h.frame().offset, h.bottom());
    }

    #[test]
    fn scrolled_up_view_is_not_hijacked_by_streaming() {
        let mut h = Harness::new(30);
        h.generating = true;
        h.frame();
        h.scroll.scroll_up(200);
        assert!(!h.scroll.is_at_bottom());
        let parked = h.scroll.offset();

        h.append_to_tail(&"x".repeat(50));
        h.append_to_tail("\nnew row\n");
        let outcome = h.frame();
        assert_eq!(outcome.offset, parked);
        assert!(!outcome.scrolled);
        assert!(!outcome.is_at_bottom);
    }

    #[test]
    fn scrolling_back_down_re_engages_pinning() {
        let mut h = Harness::new(10);
        h.frame();
        h.scroll.scroll_up(15);
        h.frame();
        h.scroll.scroll_down(15);
        assert!(h.scroll.is_at_bottom());
        h.append_to_tail("fresh\nrows\n");
        assert_eq!(h.frame().offset, h.bottom());
    }

    #[test]
    fn small_drift_within_threshold_counts_as_bottom() {
        let mut h = Harness::new(10);
        h.frame();
        h.scroll.scroll_up(DEFAULT_BOTTOM_THRESHOLD);
        assert!(h.scroll.is_at_bottom());
        h.scroll.scroll_up(1);
        assert!(!h.scroll.is_at_bottom());
    }

    #[test]
    fn scroll_to_bottom_jumps_and_re_pins() {
        let mut h = Harness::new(10);
        h.frame();
        h.scroll.scroll_to_top();
        assert_eq!(h.scroll.offset(), 0);
        assert!(!h.scroll.is_at_bottom());

        h.scroll.scroll_to_bottom();
        assert!(h.scroll.is_at_bottom());
        h.append_to_tail("a\nb\nc\n");
        assert_eq!(h.frame().offset, h.bottom());
    }

    #[test]
    fn conversation_switch_resets_before_first_measurement() {
        let mut h = Harness::new(10);
        h.frame();
        h.scroll.scroll_up(30);
        assert!(!h.scroll.is_at_bottom());

        h.conversation = ConversationId::from("c2");
        h.scroll.observe(ScrollSignature::capture(Some(&h.conversation), &h.messages, false));
        assert!(h.scroll.is_at_bottom());
        assert_eq!(h.scroll.state().last_measured, None);

        assert_eq!(h.frame().offset, h.bottom());
    }

    #[test]
    fn zero_messages_is_trivially_at_bottom() {
        let mut h = Harness::new(0);
        let outcome = h.frame();
        assert_eq!(outcome, SettleOutcome { offset: 0, is_at_bottom: true, scrolled: false });
    }

    #[test]
    fn unmeasurable_region_defers_without_scrolling() {
        let mut h = Harness::new(10);
        h.frame();
        h.scroll.scroll_up(40);
        let parked = h.scroll.offset();
        h.append_to_tail("x\n");
        h.scroll.observe(ScrollSignature::capture(Some(&h.conversation), &h.messages, false));

        let outcome = h.scroll.settle(None);
        assert_eq!(outcome.offset, parked);
        assert!(!outcome.scrolled);
        // The pending change is still applied on the next measurable frame.
        assert_eq!(h.frame().offset, parked);
    }

    #[test]
    fn unmeasured_first_frame_retries_pin_later() {
        let mut h = Harness::new(10);
        h.scroll.observe(ScrollSignature::capture(Some(&h.conversation), &h.messages, false));
        assert_eq!(h.scroll.settle(None).offset, 0);
        assert_eq!(h.frame().offset, h.bottom());
    }

    #[test]
    fn repeated_settle_in_one_cycle_is_idempotent() {
        let mut h = Harness::new(10);
        h.frame();
        h.scroll.scroll_up(5);
        h.append_to_tail("x\n");
        h.scroll.observe(ScrollSignature::capture(Some(&h.conversation), &h.messages, false));
        let metrics = h.metrics();
        let first = h.scroll.settle(Some(metrics));
        let second = h.scroll.settle(Some(metrics));
        assert_eq!(first.offset, second.offset);
        assert!(!second.scrolled);
    }

    #[test]
    fn multiple_observes_coalesce_into_one_decision() {
        let mut h = Harness::new(10);
        h.frame();
        for _ in 0..10 {
            h.append_to_tail("t\n");
            h.scroll.observe(ScrollSignature::capture(Some(&h.conversation), &h.messages, true));
        }
        let metrics = h.metrics();
        let outcome = h.scroll.settle(Some(metrics));
        assert!(outcome.scrolled);
        assert_eq!(outcome.offset, h.bottom());
        assert_eq!(
            h.scroll.state().last_measured,
            Some(ScrollSignature::capture(Some(&h.conversation), &h.messages, true))
        );
    }

    #[test]
    fn shrinking_content_clamps_offset() {
        let mut h = Harness::new(10);
        h.frame();
        h.scroll.scroll_up(10);
        h.messages.truncate(3);
        let outcome = h.frame();
        assert_eq!(outcome.offset, h.bottom());
    }

    #[test]
    fn resize_while_pinned_stays_pinned() {
        let mut h = Harness::new(10);
        h.frame();
        let taller = ScrollMetrics { content_height: h.content_height(), viewport_height: 35 };
        let outcome = h.scroll.settle(Some(taller));
        assert_eq!(outcome.offset, taller.max_offset());
        assert!(outcome.is_at_bottom);
    }

    #[test]
    fn page_keys_move_by_viewport_height() {
        let mut h = Harness::new(10);
        h.frame();
        let bottom = h.bottom();
        h.scroll.page_up();
        assert_eq!(h.scroll.offset(), bottom - (VIEWPORT - 1));
        h.scroll.page_down();
        assert_eq!(h.scroll.offset(), bottom);
    }
}
