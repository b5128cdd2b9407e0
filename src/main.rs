// GUI-subsystem binary: no console window is ever allocated by Windows.
// • GUI mode: nothing extra needed.
// • CLI mode (any headless flag present): AttachConsole(ATTACH_PARENT_PROCESS)
//   attaches to the launching terminal, then we reopen CONOUT$/CONIN$ so Rust's
//   println!/eprintln! route through the correct handles.
#![windows_subsystem = "windows"]

mod app;
mod cli;
mod components;
mod shell;

use app::MatPackApp;
use eframe::egui;
use matpack::{i18n, logger};

fn main() -> Result<(), eframe::Error> {
    // -- Windows console management ------------------------------------
    #[cfg(target_os = "windows")]
    if cli::CliArgs::is_cli_mode() {
        unsafe extern "system" {
            fn AttachConsole(dwProcessId: u32) -> i32;
            fn SetStdHandle(nStdHandle: u32, hHandle: isize) -> i32;
            fn CreateFileW(
                lpFileName: *const u16,
                dwDesiredAccess: u32,
                dwShareMode: u32,
                lpSecurityAttributes: *const std::ffi::c_void,
                dwCreationDisposition: u32,
                dwFlagsAndAttributes: u32,
                hTemplateFile: isize,
            ) -> isize;
        }
        const ATTACH_PARENT_PROCESS: u32 = 0xFFFF_FFFF;
        const GENERIC_READ: u32 = 0x8000_0000;
        const GENERIC_WRITE: u32 = 0x4000_0000;
        const FILE_SHARE_READ_WRITE: u32 = 0x0000_0003;
        const OPEN_EXISTING: u32 = 3;
        const STD_INPUT_HANDLE: u32 = 0xFFFF_FFF6_u32; // -10
        const STD_OUTPUT_HANDLE: u32 = 0xFFFF_FFF5_u32; // -11
        const STD_ERROR_HANDLE: u32 = 0xFFFF_FFF4_u32; // -12
        const INVALID_HANDLE_VALUE: isize = -1;
        unsafe {
            AttachConsole(ATTACH_PARENT_PROCESS);
            let conout: Vec<u16> = "CONOUT$\0".encode_utf16().collect();
            let conin: Vec<u16> = "CONIN$\0".encode_utf16().collect();
            let hout = CreateFileW(
                conout.as_ptr(),
                GENERIC_WRITE,
                FILE_SHARE_READ_WRITE,
                std::ptr::null(),
                OPEN_EXISTING,
                0,
                0,
            );
            if hout != INVALID_HANDLE_VALUE {
                SetStdHandle(STD_OUTPUT_HANDLE, hout);
                SetStdHandle(STD_ERROR_HANDLE, hout);
            }
            let hin = CreateFileW(
                conin.as_ptr(),
                GENERIC_READ,
                FILE_SHARE_READ_WRITE,
                std::ptr::null(),
                OPEN_EXISTING,
                0,
                0,
            );
            if hin != INVALID_HANDLE_VALUE {
                SetStdHandle(STD_INPUT_HANDLE, hin);
            }
        }
    }

    // -- CLI / headless mode ---------------------------------------------
    if cli::CliArgs::is_cli_mode() {
        use clap::Parser;
        logger::init();
        i18n::init();
        let args = cli::CliArgs::parse();
        let code = cli::run(args);
        std::process::exit(if code == std::process::ExitCode::SUCCESS {
            0
        } else {
            1
        });
    }

    // -- GUI mode -----------------------------------------------------

    // Initialize session log (overwrites previous session log)
    logger::init();
    i18n::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([700.0, 600.0])
            .with_min_inner_size([600.0, 450.0])
            .with_title("MatPack")
            .with_icon(std::sync::Arc::new(app_icon())),
        ..Default::default()
    };

    eframe::run_native(
        "MatPack",
        options,
        Box::new(|cc| Box::new(MatPackApp::new(cc))),
    )
}

/// Window icon: four quadrants in the colours of a packed texture's channels.
fn app_icon() -> egui::viewport::IconData {
    const SIDE: u32 = 32;
    let img = image::RgbaImage::from_fn(SIDE, SIDE, |x, y| {
        let rgb = match (x < SIDE / 2, y < SIDE / 2) {
            (true, true) => [0xf9, 0x26, 0x72],
            (false, true) => [0xa6, 0xe2, 0x2e],
            (true, false) => [0x4f, 0x9d, 0xf0],
            (false, false) => [0xe0, 0xe0, 0xe0],
        };
        image::Rgba([rgb[0], rgb[1], rgb[2], 0xff])
    });
    egui::viewport::IconData {
        rgba: img.into_raw(),
        width: SIDE,
        height: SIDE,
    }
}
