mod cli;
mod logging;

use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use clap::Parser;
use colored::Colorize;

use ribbit_input::{ConfigureWizard, JoystickContext, WizardState};
use ribbit_joystick::{translate_event, SdlBus};
use ribbit_prefs::{JoystickPrefs, PrefStore};

use crate::cli::{Cli, Command};

/// One polling frame, matching the engine's 50Hz tick.
const FRAME: Duration = Duration::from_millis(20);

const WATCHED: [&str; 7] = ["up", "down", "left", "right", "attack", "jump", "tongue"];

fn main() {
    let cli = Cli::parse();
    logging::setup(cli.verbose, cli.no_color);

    let sdl = match sdl2::init() {
        Ok(sdl) => sdl,
        Err(e) => {
            print_error!("could not initialize the platform layer: {e}");
            std::process::exit(1);
        }
    };
    let bus = match SdlBus::new(&sdl) {
        Ok(bus) => Rc::new(bus),
        Err(e) => {
            print_error!("could not start the device bus: {e}");
            std::process::exit(1);
        }
    };
    let mut pump = match sdl.event_pump() {
        Ok(pump) => pump,
        Err(e) => {
            print_error!("could not open the event pump: {e}");
            std::process::exit(1);
        }
    };

    let prefs_path = cli.prefs.clone();
    let mut store = load_store(&prefs_path);
    let mut ctx = JoystickContext::new(bus, JoystickPrefs::read(&store));

    match cli.command {
        Command::Devices => list_devices(&mut ctx),
        Command::Watch => watch(&mut ctx, &mut pump),
        Command::Configure => configure(&mut ctx, &mut pump, &mut store, &prefs_path),
    }
}

fn load_store(path: &str) -> PrefStore {
    if !Path::new(path).exists() {
        return PrefStore::new();
    }
    match PrefStore::load(Path::new(path)) {
        Ok(store) => store,
        Err(e) => {
            print_warning!("could not read {path}: {e}; starting fresh");
            PrefStore::new()
        }
    }
}

fn pump_events(ctx: &mut JoystickContext, pump: &mut sdl2::EventPump) {
    for event in pump.poll_iter() {
        if let Some(platform_event) = translate_event(&event) {
            ctx.handle_platform_event(&platform_event);
        }
    }
}

fn list_devices(ctx: &mut JoystickContext) {
    ctx.reconcile_devices();
    let ids = ctx.device_ids();
    let names = ctx.device_names();
    if ids.is_empty() {
        print_info!("no controller devices attached");
        return;
    }
    for (id, name) in ids.iter().zip(&names) {
        let marker = if ctx.current_device_id() == Some(*id) {
            " (bound)"
        } else {
            ""
        };
        print_info!("{id}: {name}{marker}");
    }
}

fn watch(ctx: &mut JoystickContext, pump: &mut sdl2::EventPump) {
    if ctx.current_device_id().is_none() {
        print_warning!("no controller bound; attach one to see presses");
    }
    let mut previous = [false; WATCHED.len()];
    loop {
        pump_events(ctx, pump);
        let current = [
            ctx.up(),
            ctx.down(),
            ctx.left(),
            ctx.right(),
            ctx.button(0),
            ctx.button(1),
            ctx.button(2),
        ];
        for ((name, was), is) in WATCHED.iter().zip(previous).zip(current) {
            if is && !was {
                print_info!("{name} pressed");
            } else if was && !is {
                print_debug!("{name} released");
            }
        }
        previous = current;
        std::thread::sleep(FRAME);
    }
}

fn configure(
    ctx: &mut JoystickContext,
    pump: &mut sdl2::EventPump,
    store: &mut PrefStore,
    prefs_path: &str,
) {
    let mut wizard = match ConfigureWizard::start(ctx) {
        Ok(wizard) => wizard,
        Err(e) => {
            print_error!("could not start the remapping session: {e}");
            std::process::exit(1);
        }
    };

    let mut last_prompt = String::new();
    loop {
        pump_events(ctx, pump);
        if wizard.state() != WizardState::Aborted && !ctx.session_active() {
            print_error!("the controller went away; nothing was saved");
            std::process::exit(1);
        }

        let view = wizard.advance(ctx);
        if view.prompt != last_prompt {
            if !view.prompt.is_empty() {
                print_info!("{}", view.prompt);
            }
            last_prompt = view.prompt.clone();
        }

        match view.state {
            WizardState::LivelyNeutralZone => {
                // Headless run: accept the noisy calibration and push on.
                print_warning!("controller is drifting; continuing anyway");
                wizard.proceed(ctx);
            }
            WizardState::Finished => {
                if let Err(e) = wizard.confirm(ctx) {
                    print_error!("could not apply the configuration: {e}");
                    std::process::exit(1);
                }
                ctx.write_prefs(store);
                if let Err(e) = store.save(Path::new(prefs_path)) {
                    print_error!("could not save {prefs_path}: {e}");
                    std::process::exit(1);
                }
                print_info!("configuration saved to {prefs_path}");
                return;
            }
            WizardState::Aborted => return,
            _ => {}
        }
        std::thread::sleep(FRAME);
    }
}
