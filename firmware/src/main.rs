#![no_std]
#![no_main]

//! Rotary encoder and keypad demo for the Adafruit Macropad RP2040
//!
//! Logs encoder turns, encoder button clicks and key presses to USB serial
//! (minicom -b 115200 -o -D /dev/ttyACM0)

mod logger;
mod panic;
mod timer_clock;
mod usb;

use adafruit_macropad::{
    hal::{
        self as hal,
        clocks::Clock,
        pac::{self, interrupt},
        usb::UsbBus,
    },
    Pins,
};
use core::cell::RefCell;
use cortex_m::interrupt::Mutex;
use cortex_m_rt::entry;
use embedded_time::fixed_point::FixedPoint;
use embedded_time::rate::Hertz;
use hal::gpio::dynpin::DynPin;
use log::{error, info, LevelFilter};
use rotary_input::{Encoder, KeyCode, Keypad, UserEvent};
use usb_device::class_prelude::*;

use crate::logger::SerialLogger;
use crate::timer_clock::TimerClock;
use crate::usb::UsbManager;

#[link_section = ".boot2"]
#[used]
pub static BOOT2: [u8; 256] = rp2040_boot2::BOOT_LOADER_GD25Q64CS;

pub const MAX_LOG_LEVEL: LevelFilter = LevelFilter::Debug;
pub const XOSC_CRYSTAL_FREQ: Hertz = Hertz(12_000_000);

/// Pause between main loop passes, gives the keypad a 1ms scan period.
const LOOP_DELAY_US: u32 = 1_000;

//keypad, final row: '0', '.', 'enter'
const KEY_MAP: [KeyCode; 12] = [
    KeyCode(0x5f),
    KeyCode(0x60),
    KeyCode(0x61),
    KeyCode(0x5c),
    KeyCode(0x5d),
    KeyCode(0x5e),
    KeyCode(0x59),
    KeyCode(0x5a),
    KeyCode(0x5b),
    KeyCode(0x62),
    KeyCode(0x63),
    KeyCode(0x58),
];

pub static USB_MANAGER: Mutex<RefCell<Option<UsbManager<'static, UsbBus>>>> =
    Mutex::new(RefCell::new(None));

static LOGGER: SerialLogger = SerialLogger;

#[entry]
fn main() -> ! {
    let mut pac = pac::Peripherals::take().unwrap();
    let core = pac::CorePeripherals::take().unwrap();

    let mut watchdog = hal::Watchdog::new(pac.WATCHDOG);
    let clocks = hal::clocks::init_clocks_and_plls(
        XOSC_CRYSTAL_FREQ.integer(),
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .ok()
    .unwrap();

    let sio = hal::Sio::new(pac.SIO);
    let pins = Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

    //Init USB
    static mut USB_BUS: Option<UsbBusAllocator<UsbBus>> = None;

    {
        // Set up the USB driver
        let usb_bus = UsbBusAllocator::new(UsbBus::new(
            pac.USBCTRL_REGS,
            pac.USBCTRL_DPRAM,
            clocks.usb_clock,
            true,
            &mut pac.RESETS,
        ));

        cortex_m::interrupt::free(|_cs| unsafe {
            // Note (safety): This is safe as interrupts are masked
            USB_BUS = Some(usb_bus);
        });
    }

    cortex_m::interrupt::free(|cs| {
        // Note (safety): This is safe as interrupts are masked
        let bus_ref = unsafe { USB_BUS.as_ref().unwrap() };

        USB_MANAGER
            .borrow(cs)
            .replace(Some(UsbManager::new(bus_ref)));

        unsafe {
            // Note (safety): interupts not yet enabled
            log::set_logger_racy(&LOGGER)
                .map(|()| log::set_max_level(MAX_LOG_LEVEL))
                .unwrap();
        }
    });

    // Enable the USB interrupt
    unsafe {
        pac::NVIC::unmask(hal::pac::Interrupt::USBCTRL_IRQ);
    };

    let mut delay = cortex_m::delay::Delay::new(core.SYST, clocks.system_clock.freq().integer());

    let clock = TimerClock::new(hal::Timer::new(pac.TIMER, &mut pac.RESETS));

    let rota: DynPin = pins.encoder_rota.into_pull_up_input().into();
    let rotb: DynPin = pins.encoder_rotb.into_pull_up_input().into();
    let button: DynPin = pins.button.into_pull_up_input().into();
    let mut encoder = Encoder::new(rota, rotb, button, &clock).unwrap();

    let keys: [DynPin; 12] = [
        pins.key1.into_pull_up_input().into(),
        pins.key2.into_pull_up_input().into(),
        pins.key3.into_pull_up_input().into(),
        pins.key4.into_pull_up_input().into(),
        pins.key5.into_pull_up_input().into(),
        pins.key6.into_pull_up_input().into(),
        pins.key7.into_pull_up_input().into(),
        pins.key8.into_pull_up_input().into(),
        pins.key9.into_pull_up_input().into(),
        pins.key10.into_pull_up_input().into(),
        pins.key11.into_pull_up_input().into(),
        pins.key12.into_pull_up_input().into(),
    ];
    let mut keypad = Keypad::new(keys, KEY_MAP);

    info!("Entering main loop");
    loop {
        match encoder.poll() {
            Ok(Some(event)) => report(event),
            Ok(None) => {}
            Err(e) => error!("encoder: {}", e),
        }

        match keypad.poll() {
            Ok(Some(event)) => report(event),
            Ok(None) => {}
            Err(e) => error!("keypad: {:?}", e),
        }

        delay.delay_us(LOOP_DELAY_US);
    }
}

fn report(event: UserEvent) {
    match event {
        UserEvent::Clockwise => info!("clockwise"),
        UserEvent::CounterClockwise => info!("counter clockwise"),
        UserEvent::Button => info!("button"),
        UserEvent::Key(code) => info!("key {:#04x}", code.0),
    }
}

#[allow(non_snake_case)]
#[interrupt]
fn USBCTRL_IRQ() {
    cortex_m::interrupt::free(|cs| {
        if let Some(usb) = USB_MANAGER.borrow(cs).borrow_mut().as_mut() {
            usb.service_irq();
        }
    });
}
