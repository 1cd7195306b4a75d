use std::error::Error;
use wavers::{write, Wav};

use arg::{parse_args, Args};

use speedy_rs::{Sonic, SonicStream};

// -------------------------------------------------------------------------------------------------

#[derive(Args, Debug)]
struct Arguments {
    #[arg(short = "s", long = "speed", default_value = "1.0")]
    /// The playback speed, where 2.0 plays twice as fast
    speed: f32,
    #[arg(short = "r", long = "rate", default_value = "1.0")]
    /// The resampling rate, which changes speed and pitch together
    rate: f32,
    #[arg(short = "n", long = "nonlinear", default_value = "0.0")]
    /// Speedy's nonlinear speedup factor in range [0 - 1], 0 disables it
    nonlinear: f32,
    /// Input and output file paths
    paths: Vec<String>,
}

// -------------------------------------------------------------------------------------------------

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    // Parse cmd arguments
    let args = parse_args::<Arguments>();
    let input_path: String = args
        .paths
        .first()
        .expect("Please specify an input and output path as argument")
        .to_string();
    let output_path: String = args
        .paths
        .get(1)
        .expect("Please specify an input and output path as argument")
        .to_string();

    println!("Converting `{input_path}` -> `{output_path}`");
    println!(
        "Speed: {:.2}x, Rate: {:.2}x, Nonlinear: {:.2}",
        args.speed, args.rate, args.nonlinear
    );

    // Open Wav input file
    let mut reader = Wav::<f32>::from_path(&input_path)?;
    let num_channels = reader.n_channels() as usize;
    let sample_rate = reader.sample_rate() as usize;

    // Prepare stream
    let mut stream = SonicStream::new(Sonic, sample_rate, num_channels)?;
    stream.set_speed(args.speed);
    stream.set_rate(args.rate);
    if args.nonlinear > 0.0 {
        stream.enable_nonlinear_speedup(args.nonlinear);
        stream.enable_speed_profile_recording();
    }

    // Process
    const BLOCK_FRAMES: usize = 1024;
    let mut wav_output_samples: Vec<i16> = Vec::new(); // interleaved
    let mut input_block: Vec<f32> = Vec::with_capacity(BLOCK_FRAMES * num_channels);
    let mut frames_iter = reader.frames();

    loop {
        // collect interleaved frames
        input_block.clear();
        let mut frames_read = 0;
        while frames_read < BLOCK_FRAMES {
            if let Some(frame) = frames_iter.next() {
                input_block.extend(frame.iter().take(num_channels));
                frames_read += 1;
            } else {
                break;
            }
        }

        if frames_read > 0 {
            stream.write_float(&input_block, frames_read);
            while let Some(samples) = stream.read_short::<i16>(BLOCK_FRAMES) {
                wav_output_samples.extend(samples);
            }
        }

        if frames_read < BLOCK_FRAMES {
            break; // End of input file
        }
    }

    // flush remaining output samples
    stream.flush();
    while let Some(samples) = stream.read_short::<i16>(BLOCK_FRAMES) {
        wav_output_samples.extend(samples);
    }

    // Write Wav output file
    write(
        &output_path,
        &wav_output_samples,
        sample_rate as i32,
        num_channels as u16,
    )?;

    // Summarize the speed decisions of the nonlinear speedup
    if let Some(profile) = stream.drain_speed_profile() {
        let mean = profile.iter().map(|point| point.speed).sum::<f32>() / profile.len() as f32;
        let (min, max) = profile
            .iter()
            .fold((f32::MAX, f32::MIN), |(min, max), point| {
                (min.min(point.speed), max.max(point.speed))
            });
        println!(
            "Speed profile: {} frames, mean {mean:.2}x, min {min:.2}x, max {max:.2}x",
            profile.len()
        );
    }

    println!("Done.");

    Ok(())
}
