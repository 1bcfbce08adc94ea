#![no_std]
#![no_main]

use esp_backtrace as _;
use shared::Shared;

mod power_stage;
mod sense;
mod uart;

// Sampler and scheduler state, written by the tick task
static SHARED: Shared = Shared::new();

#[rtic::app(device = esp32c3, dispatchers = [FROM_CPU_INTR0])]
mod app {
    use esp_hal::delay::Delay;
    use esp_hal::gpio::{AnyPin, Level, Output, OutputConfig};
    use esp_hal::ledc::channel::{self as ledc_channel, ChannelIFace as _};
    use esp_hal::ledc::timer::{self as ledc_timer, TimerIFace as _};
    use esp_hal::ledc::{LSGlobalClkSource, Ledc, LowSpeed};
    use esp_hal::time::{Duration, Rate};
    use esp_hal::timer::timg::{Timer, TimerGroup};
    use esp_hal::timer::PeriodicTimer;
    use esp_hal::uart::{Config as UartConfig, Uart};
    use shared::command::LineBuffer;
    use shared::config::Config;
    use shared::peripheral::write_all;
    use shared::Converter;
    use zerocopy::IntoBytes;

    use super::SHARED;
    use crate::power_stage::Board;
    use crate::sense::Sense;
    use crate::uart::{CommandPort, BAUD_RATE};

    // ~1 ms, a window of 1024 ticks is close to one second
    const TICK_PERIOD_US: u64 = 976;
    const PWM_FREQUENCY_KHZ: u32 = 125;

    #[shared]
    struct Shared {}

    #[local]
    struct Local {
        tick_timer: PeriodicTimer<'static, Timer>,
        sense: Sense,
        converter: Converter<'static, Board, Delay>,
        port: CommandPort,
    }

    #[init(local = [pwm_timer: Option<ledc_timer::Timer<'static, LowSpeed>> = None])]
    fn init(cx: init::Context) -> (Shared, Local) {
        esp_println::logger::init_logger(log::LevelFilter::Info);
        let peripherals = esp_hal::init(esp_hal::Config::default());

        let sense = Sense::new(peripherals.ADC1, peripherals.GPIO0, peripherals.GPIO1, peripherals.GPIO3);

        let mut ledc = Ledc::new(peripherals.LEDC);
        ledc.set_global_slow_clock(LSGlobalClkSource::APBClk);

        let mut pwm_timer = ledc.timer::<LowSpeed>(ledc_timer::Number::Timer0);
        pwm_timer
            .configure(ledc_timer::config::Config {
                duty: ledc_timer::config::Duty::Duty9Bit,
                clock_source: ledc_timer::LSClockSource::APBClk,
                frequency: Rate::from_khz(PWM_FREQUENCY_KHZ),
            })
            .unwrap();
        let pwm_timer = cx.local.pwm_timer.insert(pwm_timer);

        let mut pwm = ledc.channel::<LowSpeed>(ledc_channel::Number::Channel0, peripherals.GPIO4);
        pwm.configure(ledc_channel::config::Config {
            timer: &*pwm_timer,
            duty_pct: 10,
            pin_config: ledc_channel::config::PinConfig::PushPull,
        })
        .unwrap();

        let relay = |pin: AnyPin| Output::new(pin, Level::Low, OutputConfig::default());
        let board = Board::new(
            pwm,
            relay(peripherals.GPIO5.into()),
            relay(peripherals.GPIO6.into()),
            relay(peripherals.GPIO7.into()),
            [
                relay(peripherals.GPIO8.into()),
                relay(peripherals.GPIO9.into()),
                relay(peripherals.GPIO10.into()),
                relay(peripherals.GPIO18.into()),
            ],
        );

        let uart = Uart::new(
            peripherals.UART1,
            UartConfig::default().with_baudrate(BAUD_RATE),
        )
        .unwrap()
        .with_rx(peripherals.GPIO20)
        .with_tx(peripherals.GPIO21);

        let converter = Converter::new(&SHARED, board, Delay::new(), Config::default());

        let timg0 = TimerGroup::new(peripherals.TIMG0);
        let mut tick_timer = PeriodicTimer::new(timg0.timer0);
        tick_timer.enable_interrupt(true);
        tick_timer
            .start(Duration::from_micros(TICK_PERIOD_US))
            .unwrap();

        log::info!("booted");

        (
            Shared {},
            Local {
                tick_timer,
                sense,
                converter,
                port: CommandPort::new(uart),
            },
        )
    }

    #[idle(local = [converter, port, line: LineBuffer = LineBuffer::new()])]
    fn idle(cx: idle::Context) -> ! {
        let converter = cx.local.converter;
        let port = cx.local.port;
        let line = cx.local.line;

        loop {
            converter.poll();

            if SHARED.take_second() {
                write_all(port, converter.frame().as_bytes());
            }

            if line.poll(port) {
                // rejections are logged by the interpreter
                let _ = converter.interpret(line.line(), port);
                line.clear();
            }
        }
    }

    #[task(binds = TG0_T0_LEVEL, priority = 2, local = [tick_timer, sense])]
    fn tick(cx: tick::Context) {
        cx.local.tick_timer.clear_interrupt();
        SHARED.tick(cx.local.sense);
    }
}
