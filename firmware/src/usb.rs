use usb_device::class_prelude::*;
use usb_device::prelude::*;
use usbd_serial::SerialPort;

/// Owns the USB device and the serial port the logger writes to.
pub struct UsbManager<'a, B>
where
    B: usb_device::bus::UsbBus,
{
    usb_device: UsbDevice<'a, B>,
    serial_port: SerialPort<'a, B>,
}

impl<'a, B> UsbManager<'a, B>
where
    B: usb_device::bus::UsbBus,
{
    pub fn new(usb_bus: &'a UsbBusAllocator<B>) -> UsbManager<'a, B> {
        let serial_port = SerialPort::new(usb_bus);

        // Create a USB device with a fake VID and PID
        let usb_device = UsbDeviceBuilder::new(usb_bus, UsbVidPid(0x16c0, 0x27dd))
            .manufacturer("Adafruit")
            .product("Macropad encoder")
            .serial_number("TEST")
            .device_class(2) // from: https://www.usb.org/defined-class-codes
            .build();

        UsbManager {
            usb_device,
            serial_port,
        }
    }

    pub fn serial_port_borrow_mut(&mut self) -> &mut SerialPort<'a, B> {
        &mut self.serial_port
    }

    pub fn service_irq(&mut self) {
        if self.usb_device.poll(&mut [&mut self.serial_port]) {
            //input is ignored, drain it so the host doesn't stall
            let mut buf = [0u8; 64];
            match self.serial_port.read(&mut buf) {
                Err(_e) => {}
                Ok(_count) => {}
            }
        }
    }
}
