use tumble_common::BufferSize;

/// One step of the post-processing chain.
///
/// `Context` is whatever the backend needs to (re)allocate buffers, e.g. a GPU
/// device. Stages read from the composer's read buffer and write to its write
/// buffer, or to the surface when they are the last contributing stage.
pub trait RenderStage {
    type Context: ?Sized;

    fn label(&self) -> &str;

    /// Reallocate internal buffers for a new output size.
    fn resize(&mut self, ctx: &Self::Context, size: BufferSize);

    /// Size the stage was last resized to.
    fn buffer_size(&self) -> BufferSize;

    /// Disabled stages are skipped when the frame is composed.
    fn contributes_to_frame(&self) -> bool {
        true
    }

    /// Whether the composer swaps read and write buffers after this stage.
    fn needs_swap(&self) -> bool {
        true
    }
}

/// Where a stage writes in a composed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageTarget {
    /// One of the composer's two ping-pong buffers.
    Buffer(usize),
    Surface,
}

/// A single stage invocation in a composed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageRun {
    /// Index into [`Composer::stages`].
    pub stage: usize,
    /// Ping-pong buffer the stage reads from.
    pub read: usize,
    pub write: StageTarget,
}

/// Ordered list of render stages sharing one output size.
pub struct Composer<S: RenderStage + ?Sized> {
    stages: Vec<Box<S>>,
    size: BufferSize,
}

impl<S: RenderStage + ?Sized> Composer<S> {
    pub fn new(size: BufferSize) -> Self {
        Self {
            stages: Vec::new(),
            size,
        }
    }

    /// Append a stage and size it to the composer's current size.
    pub fn add_stage(&mut self, ctx: &S::Context, mut stage: Box<S>) {
        stage.resize(ctx, self.size);
        tracing::debug!(stage = stage.label(), "added render stage");
        self.stages.push(stage);
    }

    pub fn stages(&self) -> &[Box<S>] {
        &self.stages
    }

    pub fn stages_mut(&mut self) -> &mut [Box<S>] {
        &mut self.stages
    }

    pub fn size(&self) -> BufferSize {
        self.size
    }

    /// Resize every stage. No-op when the size is unchanged.
    pub fn set_size(&mut self, ctx: &S::Context, size: BufferSize) {
        if size == self.size {
            return;
        }
        self.size = size;
        for stage in &mut self.stages {
            stage.resize(ctx, size);
        }
    }

    /// Order of stage invocations for one frame.
    ///
    /// The first contributing stage reads buffer 0 and writes buffer 1; the
    /// last contributing stage writes the surface.
    pub fn frame_plan(&self) -> Vec<StageRun> {
        let active: Vec<usize> = self
            .stages
            .iter()
            .enumerate()
            .filter(|(_, s)| s.contributes_to_frame())
            .map(|(i, _)| i)
            .collect();

        let mut read = 0;
        let mut write = 1;
        let mut plan = Vec::with_capacity(active.len());
        for (n, &stage) in active.iter().enumerate() {
            let target = if n + 1 == active.len() {
                StageTarget::Surface
            } else {
                StageTarget::Buffer(write)
            };
            plan.push(StageRun {
                stage,
                read,
                write: target,
            });
            if self.stages[stage].needs_swap() {
                std::mem::swap(&mut read, &mut write);
            }
        }
        plan
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Stage that only records its size.
    pub(crate) struct FakeStage {
        pub label: &'static str,
        pub size: BufferSize,
        pub enabled: bool,
        pub swap: bool,
        pub resizes: usize,
    }

    impl FakeStage {
        pub(crate) fn boxed(label: &'static str) -> Box<dyn RenderStage<Context = ()>> {
            Box::new(Self {
                label,
                size: BufferSize::new(0, 0),
                enabled: true,
                swap: true,
                resizes: 0,
            })
        }
    }

    impl RenderStage for FakeStage {
        type Context = ();

        fn label(&self) -> &str {
            self.label
        }

        fn resize(&mut self, _ctx: &(), size: BufferSize) {
            self.size = size;
            self.resizes += 1;
        }

        fn buffer_size(&self) -> BufferSize {
            self.size
        }

        fn contributes_to_frame(&self) -> bool {
            self.enabled
        }

        fn needs_swap(&self) -> bool {
            self.swap
        }
    }

    #[test]
    fn added_stages_take_composer_size() {
        let mut composer: Composer<dyn RenderStage<Context = ()>> =
            Composer::new(BufferSize::new(640, 480));
        composer.add_stage(&(), FakeStage::boxed("scene"));
        assert_eq!(composer.stages()[0].buffer_size(), BufferSize::new(640, 480));
    }

    #[test]
    fn set_size_resizes_every_stage() {
        let mut composer: Composer<dyn RenderStage<Context = ()>> =
            Composer::new(BufferSize::new(640, 480));
        composer.add_stage(&(), FakeStage::boxed("scene"));
        composer.add_stage(&(), FakeStage::boxed("bloom"));
        composer.set_size(&(), BufferSize::new(1600, 1200));
        for stage in composer.stages() {
            assert_eq!(stage.buffer_size(), BufferSize::new(1600, 1200));
        }
        assert_eq!(composer.size(), BufferSize::new(1600, 1200));
    }

    #[test]
    fn unchanged_size_skips_resize() {
        let mut composer: Composer<FakeStage> = Composer::new(BufferSize::new(10, 10));
        composer.add_stage(
            &(),
            Box::new(FakeStage {
                label: "scene",
                size: BufferSize::new(0, 0),
                enabled: true,
                swap: true,
                resizes: 0,
            }),
        );
        composer.set_size(&(), BufferSize::new(10, 10));
        assert_eq!(composer.stages()[0].resizes, 1);
    }

    #[test]
    fn plan_ping_pongs_and_ends_on_surface() {
        let mut composer: Composer<dyn RenderStage<Context = ()>> =
            Composer::new(BufferSize::new(8, 8));
        composer.add_stage(&(), FakeStage::boxed("scene"));
        composer.add_stage(&(), FakeStage::boxed("bloom"));
        composer.add_stage(&(), FakeStage::boxed("output"));

        let plan = composer.frame_plan();
        assert_eq!(
            plan,
            vec![
                StageRun { stage: 0, read: 0, write: StageTarget::Buffer(1) },
                StageRun { stage: 1, read: 1, write: StageTarget::Buffer(0) },
                StageRun { stage: 2, read: 0, write: StageTarget::Surface },
            ]
        );
    }

    #[test]
    fn disabled_stages_are_skipped() {
        let mut composer: Composer<FakeStage> = Composer::new(BufferSize::new(8, 8));
        for (label, enabled) in [("scene", true), ("bloom", false), ("output", true)] {
            composer.add_stage(
                &(),
                Box::new(FakeStage {
                    label,
                    size: BufferSize::new(0, 0),
                    enabled,
                    swap: true,
                    resizes: 0,
                }),
            );
        }
        let plan = composer.frame_plan();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].stage, 0);
        assert_eq!(plan[1], StageRun { stage: 2, read: 1, write: StageTarget::Surface });
    }

    #[test]
    fn empty_composer_has_empty_plan() {
        let composer: Composer<FakeStage> = Composer::new(BufferSize::new(8, 8));
        assert!(composer.frame_plan().is_empty());
    }
}
