use crate::effects::Effect;

pub struct FrameLoop<E: Effect> {
    name: &'static str,
    effect: E,
    active: bool,
    frames: u64,
}

impl<E: Effect> FrameLoop<E> {
    pub fn new(name: &'static str, effect: E) -> Self {
        Self {
            name,
            effect,
            active: false,
            frames: 0,
        }
    }

    pub fn start(&mut self) -> bool {
        if self.active {
            return false;
        }
        self.effect.prepare();
        self.active = true;
        log::debug!("{} loop started", self.name);
        true
    }

    /// Deactivates the loop and releases the effect's particles. Returns
    /// false, and touches nothing, if the loop was already stopped.
    pub fn stop(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        let released = self.effect.particle_count();
        self.effect.reset();
        log::debug!(
            "{} loop stopped after {} frames, released {} particles",
            self.name,
            self.frames,
            released
        );
        true
    }

    pub fn pump(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.effect.frame();
        self.frames += 1;
        self.active
    }

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[cfg(test)]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn effect(&self) -> &E {
        &self.effect
    }

    pub fn effect_mut(&mut self) -> &mut E {
        &mut self.effect
    }
}
