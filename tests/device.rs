//! Driver behaviour against a recording mock bus

mod common;

use common::{MockBus, Operation};
use mpu6000_capture::{
    AccelRange, DeviceConfig, Mpu6000, Mpu6000Error, SensorSource, TimeKeeper, Vector,
    ALTERNATE_ADDRESS, DEFAULT_ADDRESS,
};
use std::cell::RefCell;
use std::rc::Rc;

const REG_CONFIG: u8 = 0x1A;
const REG_ACCEL_CONFIG: u8 = 0x1C;
const REG_ACCEL_XOUT_H: u8 = 0x3B;
const REG_PWR_MGMT_1: u8 = 0x6B;

fn write(address: u8, register: u8, value: u8) -> Operation {
    Operation::WriteByte {
        address,
        register,
        value,
    }
}

#[test]
fn test_construction_issues_no_traffic() {
    let bus = MockBus::new();
    let dev = Mpu6000::new(bus.clone(), DEFAULT_ADDRESS, true);
    assert_eq!(dev.address(), DEFAULT_ADDRESS);
    assert!(!dev.is_woken());
    assert!(bus.operations().is_empty());
}

#[test]
fn test_configure_wakes_then_writes() {
    let bus = MockBus::new();
    let mut dev = Mpu6000::new(bus.clone(), DEFAULT_ADDRESS, true);

    dev.configure(Some(3), Some(6)).unwrap();

    assert!(dev.is_woken());
    assert_eq!(
        bus.writes(),
        vec![
            write(DEFAULT_ADDRESS, REG_PWR_MGMT_1, 0x00),
            write(DEFAULT_ADDRESS, REG_ACCEL_CONFIG, 0x18),
            write(DEFAULT_ADDRESS, REG_CONFIG, 6),
        ]
    );
}

#[test]
fn test_configure_only_touches_given_fields() {
    let bus = MockBus::new();
    let mut dev = Mpu6000::new(bus.clone(), DEFAULT_ADDRESS, true);
    dev.configure(Some(1), Some(2)).unwrap();
    bus.clear_operations();

    dev.configure(None, Some(4)).unwrap();
    // already awake, range untouched
    assert_eq!(bus.writes(), vec![write(DEFAULT_ADDRESS, REG_CONFIG, 4)]);
    assert_eq!(bus.register(DEFAULT_ADDRESS, REG_ACCEL_CONFIG), Some(1 << 3));

    bus.clear_operations();
    dev.configure(None, None).unwrap();
    assert!(bus.operations().is_empty());
}

#[test]
fn test_invalid_range_rejected_before_any_write() {
    let bus = MockBus::new();
    let mut dev = Mpu6000::new(bus.clone(), DEFAULT_ADDRESS, true);

    let result = dev.configure(Some(5), None);
    assert!(matches!(result, Err(Mpu6000Error::InvalidConfig(_))));
    assert!(bus.writes().is_empty());
    assert!(!dev.is_woken());
}

#[test]
fn test_invalid_lpf_rejected_before_any_write() {
    let bus = MockBus::new();
    let mut dev = Mpu6000::new(bus.clone(), DEFAULT_ADDRESS, true);

    // valid range alongside an invalid filter must not be half-applied
    let result = dev.configure(Some(1), Some(7));
    assert!(matches!(result, Err(Mpu6000Error::InvalidConfig(_))));
    assert!(bus.operations().is_empty());
}

#[test]
fn test_wake_up_is_idempotent_unless_forced() {
    let bus = MockBus::new();
    let mut dev = Mpu6000::new(bus.clone(), ALTERNATE_ADDRESS, true);

    dev.wake_up(false).unwrap();
    dev.wake_up(false).unwrap();
    assert_eq!(bus.writes().len(), 1);

    dev.wake_up(true).unwrap();
    assert_eq!(
        bus.writes(),
        vec![
            write(ALTERNATE_ADDRESS, REG_PWR_MGMT_1, 0x00),
            write(ALTERNATE_ADDRESS, REG_PWR_MGMT_1, 0x00),
        ]
    );
}

#[test]
fn test_failed_wake_leaves_device_asleep() {
    let bus = MockBus::new();
    let mut dev = Mpu6000::new(bus.clone(), DEFAULT_ADDRESS, true);

    bus.fail_next_write();
    assert!(matches!(
        dev.wake_up(false),
        Err(Mpu6000Error::Bus {
            address: DEFAULT_ADDRESS,
            ..
        })
    ));
    assert!(!dev.is_woken());

    dev.wake_up(false).unwrap();
    assert!(dev.is_woken());
}

#[test]
fn test_check_alive() {
    let bus = MockBus::new();
    let mut present = Mpu6000::new(bus.clone(), DEFAULT_ADDRESS, true);
    let mut missing = Mpu6000::new(bus.clone(), ALTERNATE_ADDRESS, true);
    bus.remove_device(ALTERNATE_ADDRESS);

    assert!(present.check_alive());
    assert!(!missing.check_alive());

    bus.fail_next_read();
    assert!(!present.check_alive());
    assert!(present.check_alive());
}

#[test]
fn test_read_sensor_accel_only_uses_one_six_byte_read() {
    let bus = MockBus::new();
    bus.set_words(DEFAULT_ADDRESS, REG_ACCEL_XOUT_H, &[-100, 200, 16384]);
    let mut dev = Mpu6000::new(bus.clone(), DEFAULT_ADDRESS, true);

    let reading = dev.read_sensor().unwrap().unwrap();

    assert_eq!(reading.accel, Vector::new(-100, 200, 16384));
    assert_eq!(reading.gyro, Vector::ZERO);
    assert_eq!(
        bus.operations(),
        vec![Operation::ReadBlock {
            address: DEFAULT_ADDRESS,
            register: REG_ACCEL_XOUT_H,
            length: 6,
        }]
    );
}

#[test]
fn test_read_sensor_full_block() {
    let bus = MockBus::new();
    bus.set_words(
        DEFAULT_ADDRESS,
        REG_ACCEL_XOUT_H,
        &[1, 2, 3, -340, -4, 5, -6],
    );
    let mut dev = Mpu6000::new(bus.clone(), DEFAULT_ADDRESS, false);

    let reading = dev.read_sensor().unwrap().unwrap();

    assert_eq!(reading.accel, Vector::new(1, 2, 3));
    assert_eq!(reading.gyro, Vector::new(-4, 5, -6));
    approx::assert_relative_eq!(reading.temp, 35.53, epsilon = 1e-4);
    assert!(matches!(
        bus.operations()[0],
        Operation::ReadBlock { length: 14, .. }
    ));
}

#[test]
fn test_read_failure_is_bus_error_without_retry() {
    let bus = MockBus::new();
    let mut dev = Mpu6000::new(bus.clone(), DEFAULT_ADDRESS, true);

    bus.fail_next_read();
    assert!(matches!(dev.read_sensor(), Err(Mpu6000Error::Bus { .. })));
    assert_eq!(bus.operations().len(), 1);

    // the caller decides to retry
    assert!(dev.read_sensor().is_ok());
}

#[test]
fn test_saturated_reading_is_out_of_range() {
    let bus = MockBus::new();
    bus.set_words(DEFAULT_ADDRESS, REG_ACCEL_XOUT_H, &[0, i16::MAX, 0]);
    let mut dev = Mpu6000::new(bus, DEFAULT_ADDRESS, true);
    assert!(dev.read_sensor().unwrap().unwrap().is_out_of_range());
}

#[test]
fn test_timestamps_are_monotonic() {
    let bus = MockBus::new();
    let mut dev = Mpu6000::new(bus, DEFAULT_ADDRESS, true);
    let a = dev.read_sensor().unwrap().unwrap().timestamp;
    std::thread::sleep(std::time::Duration::from_millis(2));
    let b = dev.read_sensor().unwrap().unwrap().timestamp;
    assert!(b > a);
}

#[test]
fn test_two_devices_share_one_bus_and_clock() {
    let bus = Rc::new(RefCell::new(MockBus::new()));
    let clock = TimeKeeper::new();
    let config = DeviceConfig {
        accel_range: Some(AccelRange::G16),
        low_pass_filter: Some(1),
    };

    let mut first = Mpu6000::with_clock(Rc::clone(&bus), DEFAULT_ADDRESS, true, clock);
    let mut second = Mpu6000::with_clock(Rc::clone(&bus), ALTERNATE_ADDRESS, true, clock);
    first.apply(&config).unwrap();
    second.apply(&config).unwrap();

    let handle = bus.borrow().clone();
    assert_eq!(handle.register(DEFAULT_ADDRESS, REG_ACCEL_CONFIG), Some(0x18));
    assert_eq!(handle.register(ALTERNATE_ADDRESS, REG_ACCEL_CONFIG), Some(0x18));
    assert_eq!(handle.writes().len(), 6);

    let t1 = first.read_sensor().unwrap().unwrap().timestamp;
    let t2 = second.read_sensor().unwrap().unwrap().timestamp;
    assert!(t2 >= t1);
}
