/// Which of the two per-frame tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Advances the day counter and recomputes poses. Active only while playing.
    Simulation,
    /// Camera update + draw. Always active.
    Render,
}

/// A periodic per-frame task that can be cancelled and restarted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodicTask {
    kind: TaskKind,
    active: bool,
    runs: u64,
}

impl PeriodicTask {
    pub fn new(kind: TaskKind, active: bool) -> Self {
        Self { kind, active, runs: 0 }
    }

    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn start(&mut self) {
        self.active = true;
    }

    pub fn cancel(&mut self) {
        self.active = false;
    }

    /// Number of frames this task has run.
    pub fn runs(&self) -> u64 {
        self.runs
    }
}

/// Tasks due in the current frame, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramePlan {
    pub simulate: bool,
    pub render: bool,
}

/// Two independently cancellable tasks driven by one display-refresh pump.
///
/// Within a frame the simulation task always runs before the render task, so
/// a draw never shows poses one tick behind the counter.
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    simulation: PeriodicTask,
    render: PeriodicTask,
    frame: u64,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self {
            simulation: PeriodicTask::new(TaskKind::Simulation, false),
            render: PeriodicTask::new(TaskKind::Render, true),
            frame: 0,
        }
    }

    pub fn task(&self, kind: TaskKind) -> &PeriodicTask {
        match kind {
            TaskKind::Simulation => &self.simulation,
            TaskKind::Render => &self.render,
        }
    }

    pub fn task_mut(&mut self, kind: TaskKind) -> &mut PeriodicTask {
        match kind {
            TaskKind::Simulation => &mut self.simulation,
            TaskKind::Render => &mut self.render,
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Start one display refresh and report which tasks run in it. Callers
    /// run the simulation step (if any) to completion before drawing.
    pub fn begin_frame(&mut self) -> FramePlan {
        self.frame += 1;
        let plan = FramePlan {
            simulate: self.simulation.active,
            render: self.render.active,
        };
        if plan.simulate {
            self.simulation.runs += 1;
        }
        if plan.render {
            self.render.runs += 1;
        }
        plan
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_runs_while_simulation_cancelled() {
        let mut s = FrameScheduler::new();
        let plan = s.begin_frame();
        assert_eq!(plan, FramePlan { simulate: false, render: true });
        assert_eq!(s.task(TaskKind::Render).runs(), 1);
        assert_eq!(s.task(TaskKind::Simulation).runs(), 0);
    }

    #[test]
    fn simulation_task_follows_start_and_cancel() {
        let mut s = FrameScheduler::new();
        s.task_mut(TaskKind::Simulation).start();
        assert!(s.begin_frame().simulate);
        s.task_mut(TaskKind::Simulation).cancel();
        assert!(!s.begin_frame().simulate);
        assert_eq!(s.task(TaskKind::Simulation).runs(), 1);
        assert_eq!(s.task(TaskKind::Render).runs(), 2);
    }

    #[test]
    fn tasks_cancel_independently() {
        let mut s = FrameScheduler::new();
        s.task_mut(TaskKind::Simulation).start();
        s.task_mut(TaskKind::Render).cancel();
        let plan = s.begin_frame();
        assert!(plan.simulate);
        assert!(!plan.render);
        assert_eq!(s.frame_count(), 1);
    }
}
