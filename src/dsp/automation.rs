use std::collections::VecDeque;

/*
Parameter Automation
====================

Ambient layers never change level in a single step: a step in gain is an
audible click. Instead every gain and every pitch sweep in this crate follows a
timeline of breakpoints, in the spirit of a browser AudioParam.

Vocabulary
----------

  breakpoint  A (time, value) pair the parameter must hit. Times are local:
              seconds since the owning node started rendering.

  curve       How we travel from the previous breakpoint to this one.
                Step         hold the old value, jump at the breakpoint
                Linear       straight line
                Exponential  constant ratio per second (sounds "natural" for
                             decays and pitch sweeps)

  anchor      The breakpoint most recently passed. Ramps always start from the
              anchor, never from "now".


The Shape of a One-Shot Envelope
--------------------------------

Thunder, for example, is built from three breakpoints:

    set_value_at(0.0, 0.0)             value
    linear_ramp_to(vol, 0.3)            vol ┤  ╱╲
    exponential_ramp_to(0.01, 3.0)          │ ╱  ╲__
                                       0.01 ┤╱      ‾‾‾‾────
                                            └──┬──────────┬──→ t
                                              0.3        3.0

The Math
--------

Between anchor (t0, v0) and breakpoint (t1, v1), at local time t:

    p      = (t - t0) / (t1 - t0)
    linear = v0 + (v1 - v0) * p
    expo   = v0 * (v1 / v0) ^ p

An exponential curve cannot cross or touch zero, so when v0 and v1 do not share
a sign we fall back to the linear formula.

Fades
-----

`ramp_from_now` drops every pending breakpoint and ramps from the current value.
That is what fade-ins, teardown fades and master volume changes use, because
they are issued while the node is already playing.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Curve {
    Step,
    Linear,
    Exponential,
}

#[derive(Debug, Clone, Copy)]
struct Breakpoint {
    time: f64,
    value: f32,
    curve: Curve,
}

#[derive(Debug, Clone)]
pub struct Automation {
    value: f32,
    time: f64,
    anchor_time: f64,
    anchor_value: f32,
    breakpoints: VecDeque<Breakpoint>,
}

impl Automation {
    pub fn new(value: f32) -> Self {
        Self {
            value,
            time: 0.0,
            anchor_time: 0.0,
            anchor_value: value,
            breakpoints: VecDeque::new(),
        }
    }

    pub fn set_value_at(&mut self, value: f32, time: f64) -> &mut Self {
        self.insert(Breakpoint {
            time,
            value,
            curve: Curve::Step,
        })
    }

    pub fn linear_ramp_to(&mut self, value: f32, time: f64) -> &mut Self {
        self.insert(Breakpoint {
            time,
            value,
            curve: Curve::Linear,
        })
    }

    pub fn exponential_ramp_to(&mut self, value: f32, time: f64) -> &mut Self {
        self.insert(Breakpoint {
            time,
            value,
            curve: Curve::Exponential,
        })
    }

    /// Cancel pending breakpoints and ramp linearly from the current value.
    ///
    /// A zero duration sets the value immediately.
    pub fn ramp_from_now(&mut self, value: f32, duration: f64) {
        self.breakpoints.clear();
        self.anchor_time = self.time;
        self.anchor_value = self.value;

        if duration <= 0.0 {
            self.value = value;
            self.anchor_value = value;
        } else {
            self.breakpoints.push_back(Breakpoint {
                time: self.time + duration,
                value,
                curve: Curve::Linear,
            });
        }
    }

    fn insert(&mut self, point: Breakpoint) -> &mut Self {
        // Keep breakpoints sorted; equal times keep insertion order
        let index = self
            .breakpoints
            .iter()
            .position(|existing| existing.time > point.time)
            .unwrap_or(self.breakpoints.len());
        self.breakpoints.insert(index, point);
        self
    }

    /// Current value without advancing.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Local clock in seconds.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// The value the timeline ends on.
    pub fn target(&self) -> f32 {
        self.breakpoints
            .back()
            .map(|point| point.value)
            .unwrap_or(self.value)
    }

    /// True once every breakpoint has been passed.
    pub fn is_settled(&self) -> bool {
        self.breakpoints.is_empty()
    }

    /// Evaluate at the current time, then advance the clock by `dt` seconds.
    #[inline]
    pub fn next(&mut self, dt: f64) -> f32 {
        self.evaluate();
        self.time += dt;
        self.value
    }

    fn evaluate(&mut self) {
        while let Some(point) = self.breakpoints.front().copied() {
            if point.time > self.time {
                break;
            }
            self.value = point.value;
            self.anchor_time = point.time;
            self.anchor_value = point.value;
            self.breakpoints.pop_front();
        }

        let Some(point) = self.breakpoints.front() else {
            return;
        };

        let span = point.time - self.anchor_time;
        if span <= 0.0 {
            return;
        }
        let progress = ((self.time - self.anchor_time) / span).clamp(0.0, 1.0) as f32;
        let (v0, v1) = (self.anchor_value, point.value);

        self.value = match point.curve {
            Curve::Step => v0,
            Curve::Exponential if v0 * v1 > 0.0 => v0 * (v1 / v0).powf(progress),
            Curve::Linear | Curve::Exponential => v0 + (v1 - v0) * progress,
        };
    }

    /// Write successive values into `out`.
    pub fn render(&mut self, out: &mut [f32], sample_rate: f32) {
        let dt = 1.0 / sample_rate as f64;
        if self.is_settled() {
            out.fill(self.value);
            self.time += dt * out.len() as f64;
            return;
        }
        for sample in out.iter_mut() {
            *sample = self.next(dt);
        }
    }

    /// Multiply `signal` by successive values.
    pub fn apply(&mut self, signal: &mut [f32], sample_rate: f32) {
        let dt = 1.0 / sample_rate as f64;
        if self.is_settled() {
            let gain = self.value;
            for sample in signal.iter_mut() {
                *sample *= gain;
            }
            self.time += dt * signal.len() as f64;
            return;
        }
        for sample in signal.iter_mut() {
            *sample *= self.next(dt);
        }
    }
}
