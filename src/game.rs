//! World state and the per-tick update: physics, pipes, clouds, scoring.

use rand::Rng;

/// World units per rendered pixel. An 80x24 terminal maps to a 960x576 world,
/// which is the scale the gameplay constants below are tuned for.
pub const WORLD_SCALE: f64 = 12.0;

pub const GRAVITY: f64 = 0.5;
pub const LIFT: f64 = -8.0;
pub const BIRD_RADIUS: f64 = 20.0;

pub const PIPE_WIDTH: f64 = 60.0;
pub const PIPE_INTERVAL: u64 = 90;
pub const BASE_GAP: f64 = 150.0;
pub const GAP_STEP: f64 = 10.0;
pub const MIN_GAP: f64 = 90.0;
pub const BASE_PIPE_SPEED: f64 = 3.0;

pub const CLOUD_INTERVAL: u64 = 150;

/// Score multiples at which the level goes up.
pub const LEVEL_EVERY: u32 = 10;

/// Frames between the game-over overlay and the summary panel (~0.8s at 30fps).
pub const SUMMARY_DELAY: u32 = 24;

pub struct Bird {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub velocity: f64,
}

pub struct Pipe {
    pub x: f64,
    pub width: f64,
    /// Gap top boundary; the upper segment spans 0..top.
    pub top: f64,
    /// Gap bottom boundary; the lower segment spans bottom..height.
    pub bottom: f64,
    pub speed: f64,
    pub passed: bool,
}

/// Purely decorative. No collision, no scoring.
pub struct Cloud {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub speed: f64,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Ready,
    Playing,
    Dead,
}

/// What a tick did, for the caller to react to (sounds, best score).
#[derive(Default)]
pub struct TickEvents {
    pub scored: bool,
    pub leveled: bool,
    pub died: bool,
}

pub struct Game {
    pub width: f64,
    pub height: f64,
    pub bird: Bird,
    pub pipes: Vec<Pipe>,
    pub clouds: Vec<Cloud>,
    pub frame: u64,
    pub score: u32,
    pub level: u32,
    pub phase: Phase,
    pub dead_frames: u32,
}

impl Game {
    pub fn new(width: f64, height: f64) -> Self {
        Game {
            width,
            height,
            bird: Bird {
                x: width / 6.0,
                y: height / 2.0,
                radius: BIRD_RADIUS,
                velocity: 0.0,
            },
            pipes: Vec::new(),
            clouds: Vec::new(),
            frame: 0,
            score: 0,
            level: 1,
            phase: Phase::Ready,
            dead_frames: 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Game::new(self.width, self.height);
    }

    /// The render surface changed size. Only the world bounds move; entities
    /// keep their absolute coordinates.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// Whether the post-game summary panel (and the restart control) is up.
    pub fn summary_shown(&self) -> bool {
        self.phase == Phase::Dead && self.dead_frames >= SUMMARY_DELAY
    }

    /// The one discrete input. Ready starts a fresh run, Playing flaps,
    /// Dead returns to the title screen once the summary is up.
    pub fn activate(&mut self) {
        match self.phase {
            Phase::Ready => {
                self.reset();
                self.phase = Phase::Playing;
            }
            Phase::Playing => {
                self.bird.velocity = LIFT;
            }
            Phase::Dead => {
                if self.summary_shown() {
                    self.reset();
                }
            }
        }
    }

    pub fn update<R: Rng>(&mut self, rng: &mut R) -> TickEvents {
        let mut events = TickEvents::default();
        match self.phase {
            Phase::Ready => {}
            Phase::Dead => self.dead_frames += 1,
            Phase::Playing => self.step(rng, &mut events),
        }
        events
    }

    fn step<R: Rng>(&mut self, rng: &mut R, events: &mut TickEvents) {
        self.step_bird(events);
        if self.phase == Phase::Dead {
            return;
        }
        self.step_pipes(rng, events);
        if self.phase == Phase::Dead {
            return;
        }
        self.step_clouds(rng);
        self.frame += 1;
    }

    fn step_bird(&mut self, events: &mut TickEvents) {
        let bird = &mut self.bird;
        bird.velocity += GRAVITY;
        bird.y += bird.velocity;

        // The floor ends the run; the ceiling only stops the climb.
        if bird.y + bird.radius > self.height {
            bird.y = self.height - bird.radius;
            self.phase = Phase::Dead;
            self.dead_frames = 0;
            events.died = true;
        }
        if bird.y - bird.radius < 0.0 {
            bird.y = bird.radius;
            bird.velocity = 0.0;
        }
    }

    fn step_pipes<R: Rng>(&mut self, rng: &mut R, events: &mut TickEvents) {
        if self.frame % PIPE_INTERVAL == 0 {
            self.spawn_pipe(rng);
        }

        let bird = &self.bird;
        let mut died = false;
        let mut passed = 0u32;
        for pipe in &mut self.pipes {
            pipe.x -= pipe.speed;

            let overlaps_x =
                bird.x + bird.radius > pipe.x && bird.x - bird.radius < pipe.x + pipe.width;
            let exits_gap =
                bird.y - bird.radius < pipe.top || bird.y + bird.radius > pipe.bottom;
            if overlaps_x && exits_gap {
                died = true;
            }

            if !pipe.passed && pipe.x + pipe.width < bird.x {
                pipe.passed = true;
                passed += 1;
            }
        }
        self.pipes.retain(|p| p.x + p.width > 0.0);

        for _ in 0..passed {
            self.score += 1;
            events.scored = true;
            if self.score % LEVEL_EVERY == 0 {
                self.level += 1;
                events.leveled = true;
            }
        }

        if died {
            self.phase = Phase::Dead;
            self.dead_frames = 0;
            events.died = true;
        }
    }

    fn spawn_pipe<R: Rng>(&mut self, rng: &mut R) {
        let gap = (BASE_GAP - self.level as f64 * GAP_STEP).max(MIN_GAP);
        // Gap top lands somewhere in the upper half of the world.
        let top = rng.gen_range(0.0..self.height / 2.0);
        self.pipes.push(Pipe {
            x: self.width,
            width: PIPE_WIDTH,
            top,
            bottom: top + gap,
            speed: BASE_PIPE_SPEED + self.level as f64,
            passed: false,
        });
    }

    fn step_clouds<R: Rng>(&mut self, rng: &mut R) {
        if self.frame % CLOUD_INTERVAL == 0 {
            self.clouds.push(Cloud {
                x: self.width,
                y: rng.gen_range(0.0..self.height / 3.0),
                radius: 40.0 + rng.gen_range(0.0..30.0),
                speed: 1.0 + rng.gen_range(0.0..1.0),
            });
        }
        for cloud in &mut self.clouds {
            cloud.x -= cloud.speed;
        }
        self.clouds.retain(|c| c.x + c.radius > 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    fn game() -> Game {
        Game::new(960.0, 576.0)
    }

    fn playing() -> Game {
        let mut g = game();
        g.activate();
        g
    }

    fn gap_pipe(x: f64, speed: f64) -> Pipe {
        // Gap wide open around the bird's starting height.
        Pipe {
            x,
            width: PIPE_WIDTH,
            top: 100.0,
            bottom: 500.0,
            speed,
            passed: false,
        }
    }

    #[test]
    fn new_game_defaults() {
        let g = game();
        assert_eq!(g.phase, Phase::Ready);
        assert_eq!(g.frame, 0);
        assert_eq!(g.score, 0);
        assert_eq!(g.level, 1);
        assert!(g.pipes.is_empty());
        assert!(g.clouds.is_empty());
        assert!((g.bird.x - 160.0).abs() < f64::EPSILON);
        assert!((g.bird.y - 288.0).abs() < f64::EPSILON);
        assert!((g.bird.radius - BIRD_RADIUS).abs() < f64::EPSILON);
    }

    #[test]
    fn activate_from_ready_resets_everything() {
        let mut g = game();
        g.pipes.push(gap_pipe(300.0, 4.0));
        g.clouds.push(Cloud {
            x: 100.0,
            y: 50.0,
            radius: 40.0,
            speed: 1.0,
        });
        g.frame = 77;
        g.score = 5;
        g.level = 3;

        g.activate();

        assert_eq!(g.phase, Phase::Playing);
        assert_eq!(g.frame, 0);
        assert_eq!(g.score, 0);
        assert_eq!(g.level, 1);
        assert!(g.pipes.is_empty());
        assert!(g.clouds.is_empty());
    }

    #[test]
    fn ready_ticks_change_nothing() {
        let mut g = game();
        g.pipes.push(gap_pipe(300.0, 4.0));
        let y = g.bird.y;

        g.update(&mut rng());

        assert_eq!(g.frame, 0);
        assert!((g.bird.y - y).abs() < f64::EPSILON);
        assert!((g.pipes[0].x - 300.0).abs() < f64::EPSILON);
    }

    #[test]
    fn gravity_integrates_each_tick() {
        let mut g = playing();
        let y0 = g.bird.y;

        g.update(&mut rng());

        assert!((g.bird.velocity - GRAVITY).abs() < f64::EPSILON);
        assert!((g.bird.y - (y0 + GRAVITY)).abs() < f64::EPSILON);
    }

    #[test]
    fn impulse_overrides_velocity_exactly() {
        let mut g = playing();
        g.update(&mut rng());
        g.activate();
        assert!((g.bird.velocity - LIFT).abs() < f64::EPSILON);

        g.update(&mut rng());
        assert!((g.bird.velocity - (LIFT + GRAVITY)).abs() < f64::EPSILON);
    }

    #[test]
    fn ceiling_clamps_position_and_zeroes_velocity() {
        let mut g = playing();
        g.frame = 1; // off the spawn cadence
        g.bird.y = 25.0;
        g.bird.velocity = -10.0;

        g.update(&mut rng());

        assert!((g.bird.y - g.bird.radius).abs() < f64::EPSILON);
        assert!((g.bird.velocity - 0.0).abs() < f64::EPSILON);
        assert_eq!(g.phase, Phase::Playing);
    }

    #[test]
    fn floor_is_lethal_and_clamps() {
        let mut g = playing();
        g.frame = 1;
        g.bird.y = 555.0;
        g.bird.velocity = 10.0;

        let events = g.update(&mut rng());

        assert!(events.died);
        assert_eq!(g.phase, Phase::Dead);
        assert!((g.bird.y - (g.height - g.bird.radius)).abs() < f64::EPSILON);
    }

    #[test]
    fn pipe_collision_kills() {
        let mut g = playing();
        g.frame = 1;
        // Pipe overlapping the bird, gap entirely above it.
        g.pipes.push(Pipe {
            x: g.bird.x - 30.0,
            width: PIPE_WIDTH,
            top: 100.0,
            bottom: 200.0,
            speed: 2.0,
            passed: false,
        });

        let events = g.update(&mut rng());

        assert!(events.died);
        assert_eq!(g.phase, Phase::Dead);
    }

    #[test]
    fn bird_inside_gap_survives() {
        let mut g = playing();
        g.frame = 1;
        g.pipes.push(gap_pipe(g.bird.x - 30.0, 2.0));

        let events = g.update(&mut rng());

        assert!(!events.died);
        assert_eq!(g.phase, Phase::Playing);
    }

    #[test]
    fn passing_a_pipe_scores_exactly_once() {
        let mut g = playing();
        g.frame = 1;
        // Trailing edge crosses behind the bird on the first move.
        g.pipes.push(gap_pipe(101.0, 4.0));

        let events = g.update(&mut rng());
        assert!(events.scored);
        assert_eq!(g.score, 1);
        assert!(g.pipes[0].passed);

        let events = g.update(&mut rng());
        assert!(!events.scored);
        assert_eq!(g.score, 1);
    }

    #[test]
    fn offscreen_pipes_are_pruned() {
        let mut g = playing();
        g.frame = 1;
        let mut pipe = gap_pipe(-55.0, 10.0);
        pipe.passed = true;
        g.pipes.push(pipe);

        g.update(&mut rng());

        assert!(g.pipes.is_empty());
    }

    #[test]
    fn level_up_at_score_ten_shrinks_next_gap() {
        let mut g = playing();
        g.frame = 1;
        g.score = 9;
        g.pipes.push(gap_pipe(101.0, 4.0));

        let events = g.update(&mut rng());
        assert_eq!(g.score, 10);
        assert_eq!(g.level, 2);
        assert!(events.leveled);

        // Next spawn uses the level-2 parameters.
        g.frame = 90;
        g.update(&mut rng());
        let pipe = g.pipes.last().unwrap();
        assert!((pipe.bottom - pipe.top - 130.0).abs() < f64::EPSILON);
        assert!((pipe.speed - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn gap_never_shrinks_below_minimum() {
        let mut g = playing();
        g.level = 20;
        g.frame = 90;
        g.update(&mut rng());
        let pipe = g.pipes.last().unwrap();
        assert!((pipe.bottom - pipe.top - MIN_GAP).abs() < f64::EPSILON);
    }

    #[test]
    fn spawned_gap_top_stays_in_upper_half() {
        let mut g = playing();
        let mut r = rng();
        for _ in 0..20 {
            g.frame = 90;
            g.pipes.clear();
            g.update(&mut r);
            let pipe = g.pipes.last().unwrap();
            assert!(pipe.top >= 0.0);
            assert!(pipe.top < g.height / 2.0);
            assert!((pipe.speed - (BASE_PIPE_SPEED + g.level as f64)).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn clouds_spawn_move_and_prune() {
        let mut g = playing();
        g.update(&mut rng()); // frame 0: one cloud
        assert_eq!(g.clouds.len(), 1);
        let cloud = &g.clouds[0];
        assert!(cloud.y < g.height / 3.0);
        assert!(cloud.radius >= 40.0 && cloud.radius < 70.0);
        assert!(cloud.speed >= 1.0 && cloud.speed < 2.0);

        g.update(&mut rng()); // frame 1: no new cloud
        assert_eq!(g.clouds.len(), 1);

        g.clouds.clear();
        g.clouds.push(Cloud {
            x: 4.0,
            y: 50.0,
            radius: 5.0,
            speed: 10.0,
        });
        g.frame = 1;
        g.update(&mut rng());
        assert!(g.clouds.is_empty());
    }

    #[test]
    fn dead_world_is_frozen_until_summary_dismissed() {
        let mut g = playing();
        g.frame = 1;
        g.bird.y = 555.0;
        g.bird.velocity = 10.0;
        g.update(&mut rng());
        assert_eq!(g.phase, Phase::Dead);

        let y = g.bird.y;
        g.update(&mut rng());
        assert!((g.bird.y - y).abs() < f64::EPSILON);
        assert_eq!(g.dead_frames, 1);

        // Activate before the summary delay is ignored.
        g.activate();
        assert_eq!(g.phase, Phase::Dead);

        g.dead_frames = SUMMARY_DELAY;
        assert!(g.summary_shown());
        g.activate();
        assert_eq!(g.phase, Phase::Ready);
        assert_eq!(g.score, 0);
        assert_eq!(g.frame, 0);
    }

    #[test]
    fn resize_keeps_absolute_coordinates() {
        let mut g = playing();
        g.pipes.push(gap_pipe(300.0, 4.0));
        let (bx, by) = (g.bird.x, g.bird.y);

        g.resize(1200.0, 720.0);

        assert!((g.width - 1200.0).abs() < f64::EPSILON);
        assert!((g.height - 720.0).abs() < f64::EPSILON);
        assert!((g.bird.x - bx).abs() < f64::EPSILON);
        assert!((g.bird.y - by).abs() < f64::EPSILON);
        assert!((g.pipes[0].x - 300.0).abs() < f64::EPSILON);
    }
}
