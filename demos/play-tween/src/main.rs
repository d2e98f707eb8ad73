use std::error::Error;

use gtween::{FixedTimestep, Scheduler, SchedulerConfig};

mod scene;
use scene::Scene;

const STEP: f32 = 1.0 / 60.0;
const REPORT_EVERY: f32 = 0.5;

/// Uneven frame times, the way a real render loop delivers them.
const FRAMES: [f32; 4] = [0.016, 0.021, 0.012, 0.019];

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Optional scheduler config as a JSON file path.
    let config = match std::env::args().nth(1) {
        Some(path) => SchedulerConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => SchedulerConfig::default(),
    };
    let mut scheduler = Scheduler::with_config(config)?;

    let scene = Scene::new();
    scene.animate(&mut scheduler)?;
    log::info!("play-tween: {} animations registered", scheduler.len());

    let mut timestep = FixedTimestep::new(STEP)?;
    let mut time = 0.0_f32;
    let mut next_report = 0.0_f32;
    let mut frame = 0;

    while scheduler.has_active() {
        let frame_dt = FRAMES[frame % FRAMES.len()];
        frame += 1;
        for _ in 0..timestep.accumulate(frame_dt)? {
            let report = scheduler.tick(timestep.step())?;
            for fault in &report.faults {
                log::error!("{:?} failed: {}", fault.id, fault.message);
            }
            time += timestep.step();
        }
        if time >= next_report {
            scene.log_state(time);
            next_report += REPORT_EVERY;
        }
    }

    scene.log_state(time);
    log::info!("play-tween: finished after {} frames", frame);
    scheduler.shutdown();
    Ok(())
}
