//! Scripted voice drive over flat ground
//!
//! Run with `VOXKART_LOG=debug` to see every dispatched command.

use tracing::info;
use voxkart_runtime::{init_logging, LogFormat, SessionConfig};
use voxkart_test::{LoudnessProfile, ScenarioBuilder};

fn main() {
    init_logging("info", LogFormat::Text);

    let builder = ScenarioBuilder::new()
        .config(SessionConfig::default())
        .loudness(LoudnessProfile::talking())
        .seed(7)
        .say(4.5, "accelerate")
        .say(7.0, "left")
        .say(8.0, "straight")
        .say(9.0, "right")
        .say(10.0, "straight")
        .say(11.0, "pause")
        .say(12.0, "pause")
        .say(13.0, "brake")
        .duration(15.0);

    let mut scenario = match builder.build() {
        Ok(scenario) => scenario,
        Err(e) => {
            eprintln!("invalid session config: {}", e);
            std::process::exit(1);
        }
    };

    let mut last_second = -1i32;
    while scenario.elapsed() < 15.0 {
        let sample = scenario.step();
        let second = sample.time as i32;
        if second != last_second {
            last_second = second;
            let race = scenario.session().race();
            let label = race
                .countdown_label()
                .map(str::to_string)
                .unwrap_or_else(|| race.race_time_label());
            println!(
                "{:>5.1}s  {:<9} {:>6}  pos ({:>6.2}, {:>5.2}, {:>6.2})  heading {:>7.1}  throttle {:>4.1}  steer {:>4.1}",
                sample.time,
                sample.phase.name(),
                label,
                sample.position.x,
                sample.position.y,
                sample.position.z,
                sample.heading_deg,
                sample.acceleration_input,
                sample.steering_input,
            );
        }
    }

    let stats = scenario.session().stats();
    info!(
        frames = stats.frames,
        fixed_ticks = stats.fixed_ticks,
        commands = stats.commands_dispatched,
        rejected = stats.phrases_rejected,
        "drive finished"
    );
}
