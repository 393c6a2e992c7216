// What you SEE:
// • A dusk gradient with the current mask spelled out in characters from the text pools.
// • Type a line and press Enter: it is classified, planted in its pool, and flashes up.
// • Right arrow cross-fades to the next mask. Up/Down reveal, PageUp/PageDown zoom,
//   Home/End text mix. F5 pauses. ESC quits.
// • Lines on stdin speak the sensor protocol (numbers, NEXT, PLANT, TEXT:..., PAUSE).

use std::io;
use std::path::PathBuf;
use std::sync::mpsc::TryRecvError;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use log::{debug, info};
use minifb::Key;

use text_mosaic::config::{Config, MaskList};
use text_mosaic::draw::{Drawer, draw_hud_line};
use text_mosaic::input::{key_to_char, spawn_line_reader};
use text_mosaic::types::Rgb;
use text_mosaic::{MaskSet, Mosaic};

#[derive(Parser, Debug)]
#[command(about = "Live text mosaic over grayscale masks")]
struct Args {
    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for pool overwrites and highlight placement
    #[arg(long)]
    seed: Option<u32>,
    /// Mask images, in display order (overrides the config list)
    masks: Vec<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    let args = Args::parse();
    let mut config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    if !args.masks.is_empty() {
        config.masks = MaskList(args.masks);
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    /* --- Masks + window ---
       Visual: window opens at the configured surface size. */
    let (w, h) = (config.window.width, config.window.height);
    let masks = MaskSet::open(&config.masks.0, w as u32, h as u32);
    if masks.is_empty() {
        info!("no masks loaded; the mosaic stays empty until restarted with masks");
    }
    let mut drawer = Drawer::new(&config.window.title, w, h, config.window.fps).context("Failed to open window")?;

    let mut mosaic = Mosaic::from_config(&config, masks);
    let mut screen = mosaic.new_frame_buffer();

    /* --- External line stream (sensor link / scripted input) --- */
    let commands = spawn_line_reader(io::BufReader::new(io::stdin()));
    let mut commands_open = true;

    /* --- HUD / FPS --- */
    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;
    let mut hud_fps_text = String::from("FPS: 0.0");

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        let now = Instant::now();

        /* 1) Events that arrived since the last frame. */
        while commands_open {
            match commands.try_recv() {
                Ok(cmd) => mosaic.apply(cmd),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    debug!("input stream closed");
                    commands_open = false;
                }
            }
        }
        handle_keys(&drawer, &mut mosaic);

        /* 2) Compose, then HUD text. A paused mosaic keeps the last frame on screen. */
        if mosaic.render(&mut screen).is_some() {
            let c = mosaic.controls();
            let (reveal, zoom) = mosaic.resolved();
            let hud = format!("mix {:.2} | zoom {:.2} | reveal {:.2} | {}", c.mix, zoom, reveal, hud_fps_text);
            draw_hud_line(&mut screen, 8, 8, &hud, Rgb(255, 255, 255));
            draw_hud_line(&mut screen, 8, 20, mosaic.status(), Rgb(200, 220, 200));
            draw_hud_line(&mut screen, 8, h as i32 - 16, &format!("> {}_", mosaic.draft()), Rgb(255, 240, 220));
        }

        /* 3) Present to the window. */
        drawer.present(&screen).context("Failed to present frame")?;

        /* 4) FPS counter */
        frames_this_second += 1;
        if now.duration_since(last_fps_time) >= Duration::from_secs(1) {
            let secs = now.duration_since(last_fps_time).as_secs_f32();
            let fps = frames_this_second as f32 / secs;
            debug!("FPS: {:.1}", fps);
            hud_fps_text = format!("FPS: {:.1}", fps);
            frames_this_second = 0;
            last_fps_time = now;
        }
    }

    info!("window closed after {} frames", mosaic.frame_count());
    Ok(())
}

fn handle_keys(drawer: &Drawer, mosaic: &mut Mosaic) {
    let shift = drawer.shift_down();
    let step = mosaic.control_step();
    for key in drawer.keys_pressed() {
        let c = mosaic.controls();
        match key {
            Key::Enter => {
                mosaic.plant();
            }
            Key::Backspace => mosaic.pop_draft(),
            Key::Right => {
                mosaic.advance_mask();
            }
            Key::Up => mosaic.set_reveal_fraction(c.reveal + step),
            Key::Down => mosaic.set_reveal_fraction(c.reveal - step),
            Key::PageUp => mosaic.set_zoom(c.zoom + step),
            Key::PageDown => mosaic.set_zoom(c.zoom - step),
            Key::Home => mosaic.set_mix_opacity(c.mix + step),
            Key::End => mosaic.set_mix_opacity(c.mix - step),
            Key::F5 => mosaic.toggle_pause(),
            other => {
                if let Some(ch) = key_to_char(other, shift) {
                    mosaic.push_draft(ch);
                }
            }
        }
    }
}
