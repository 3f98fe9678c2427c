use futures::future::{self, FutureExt};

use super::animation::{AnimationOp, Playback, Visualizer};

/// How a render pass started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPass {
    /// Nothing to animate; the pass can be committed right away
    Immediate,
    /// This many transitions are playing; commit once they settle
    Playing(usize),
}

/// Queues the transitions produced by one grid mutation pass and plays
/// them on a [`Visualizer`].
///
/// The render guard goes up when a pass begins and stays up until
/// [`finish`](Self::finish) is called after the playback resolved, so it
/// spans the whole frame rather than just the scheduling of it.
#[derive(Default)]
pub struct AnimationChoreographer {
    queue: Vec<AnimationOp>,
    rendering: bool,
    pending: Option<Playback>,
}

impl AnimationChoreographer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: AnimationOp) {
        self.queue.push(op);
    }

    pub fn extend(&mut self, ops: impl IntoIterator<Item = AnimationOp>) {
        self.queue.extend(ops);
    }

    /// Ops queued for the next pass
    pub fn queued(&self) -> &[AnimationOp] {
        &self.queue
    }

    /// Whether a pass is between [`begin`](Self::begin) and [`finish`](Self::finish)
    pub fn is_rendering(&self) -> bool {
        self.rendering
    }

    /// Whether a playback is still in flight
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Start a pass: raise the guard, hand every queued op to the visualizer
    /// at once and empty the queue.
    ///
    /// A pass begun while an earlier playback is still in flight joins it,
    /// so the commit waits for both.
    pub fn begin<V: Visualizer>(&mut self, visualizer: &V) -> RenderPass {
        self.rendering = true;
        let ops = std::mem::take(&mut self.queue);

        if ops.is_empty() {
            return match self.pending {
                Some(_) => RenderPass::Playing(0),
                None => RenderPass::Immediate,
            };
        }

        let count = ops.len();
        let playback: Playback = future::try_join_all(ops.iter().map(|op| visualizer.play(op)))
            .map(|result| result.map(|_| ()))
            .boxed_local();

        self.pending = Some(match self.pending.take() {
            Some(earlier) => async move {
                let (earlier, current) = future::join(earlier, playback).await;
                earlier.and(current)
            }
            .boxed_local(),
            None => playback,
        });
        RenderPass::Playing(count)
    }

    /// Wait for the in-flight playback, if any.
    ///
    /// Cancel-safe: dropping the returned future leaves the playback stored
    /// and it resumes on the next call.
    pub async fn settle(&mut self) -> anyhow::Result<()> {
        let Some(playback) = self.pending.as_mut() else {
            return Ok(());
        };
        let result = playback.await;
        self.pending = None;
        result
    }

    /// Lower the guard once the pass has been committed
    pub fn finish(&mut self) {
        self.rendering = false;
    }

    /// Drop everything: queued ops, any in-flight playback and the guard
    pub fn reset(&mut self) {
        self.queue.clear();
        self.pending = None;
        self.rendering = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::{Position, Snapshot};
    use futures::channel::oneshot;
    use std::cell::RefCell;

    /// Playback of each op completes when the test says so
    #[derive(Default)]
    struct GatedVisualizer {
        gates: RefCell<Vec<oneshot::Sender<()>>>,
    }

    impl GatedVisualizer {
        fn open_all(&self) {
            for gate in self.gates.borrow_mut().drain(..) {
                let _ = gate.send(());
            }
        }
    }

    impl Visualizer for GatedVisualizer {
        fn play(&self, _op: &AnimationOp) -> Playback {
            let (tx, rx) = oneshot::channel();
            self.gates.borrow_mut().push(tx);
            async move {
                rx.await?;
                Ok(())
            }
            .boxed_local()
        }

        fn mount(&self, _snapshot: &Snapshot) {}
    }

    fn pop(row: usize, col: usize) -> AnimationOp {
        AnimationOp::Pop {
            target: Position::new(row, col),
        }
    }

    #[test]
    fn test_empty_queue_is_immediate() {
        let visualizer = GatedVisualizer::default();
        let mut choreographer = AnimationChoreographer::new();

        assert_eq!(choreographer.begin(&visualizer), RenderPass::Immediate);
        assert!(choreographer.is_rendering());
        assert!(!choreographer.has_pending());
        choreographer.finish();
        assert!(!choreographer.is_rendering());
    }

    #[tokio::test]
    async fn test_guard_spans_playback() {
        let visualizer = GatedVisualizer::default();
        let mut choreographer = AnimationChoreographer::new();
        choreographer.extend([pop(0, 0), pop(0, 1)]);

        assert_eq!(choreographer.begin(&visualizer), RenderPass::Playing(2));
        assert!(choreographer.queued().is_empty());
        assert!(choreographer.is_rendering());
        assert!(choreographer.has_pending());
        assert_eq!(visualizer.gates.borrow().len(), 2);

        visualizer.open_all();
        choreographer.settle().await.unwrap();
        assert!(!choreographer.has_pending());
        assert!(choreographer.is_rendering());

        choreographer.finish();
        assert!(!choreographer.is_rendering());
    }

    #[tokio::test]
    async fn test_second_pass_joins_first() {
        let visualizer = GatedVisualizer::default();
        let mut choreographer = AnimationChoreographer::new();

        choreographer.push(pop(0, 0));
        choreographer.begin(&visualizer);
        choreographer.push(pop(1, 1));
        assert_eq!(choreographer.begin(&visualizer), RenderPass::Playing(1));

        visualizer.open_all();
        choreographer.settle().await.unwrap();
        assert!(!choreographer.has_pending());
    }

    #[tokio::test]
    async fn test_failed_playback_is_reported() {
        let visualizer = GatedVisualizer::default();
        let mut choreographer = AnimationChoreographer::new();
        choreographer.push(pop(0, 0));
        choreographer.begin(&visualizer);

        // dropping the sender cancels the playback
        visualizer.gates.borrow_mut().clear();
        assert!(choreographer.settle().await.is_err());
        assert!(!choreographer.has_pending());
    }

    #[test]
    fn test_reset_drops_everything() {
        let visualizer = GatedVisualizer::default();
        let mut choreographer = AnimationChoreographer::new();
        choreographer.push(pop(0, 0));
        choreographer.begin(&visualizer);
        choreographer.push(pop(0, 1));

        choreographer.reset();
        assert!(!choreographer.is_rendering());
        assert!(!choreographer.has_pending());
        assert!(choreographer.queued().is_empty());
    }
}
