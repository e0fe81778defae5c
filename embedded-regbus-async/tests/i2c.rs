use embassy_futures::block_on;
use embedded_hal::i2c::{ErrorKind, ErrorType, Operation, SevenBitAddress};
use embedded_hal_async::i2c::I2c;
use embedded_regbus_async::{BusError, I2cRegisterBus, RegisterBus};

/// A register-file I2C target: the first written byte selects the register
/// pointer, further written bytes are stored, reads auto-increment.
struct FakeTarget {
    address: SevenBitAddress,
    regs: [u8; 256],
    fail: bool,
    transactions: usize,
}

impl FakeTarget {
    fn new(address: SevenBitAddress) -> Self {
        Self {
            address,
            regs: [0; 256],
            fail: false,
            transactions: 0,
        }
    }
}

impl ErrorType for FakeTarget {
    type Error = ErrorKind;
}

impl I2c for FakeTarget {
    async fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.transactions += 1;
        if self.fail {
            return Err(ErrorKind::Bus);
        }
        if address != self.address {
            return Err(ErrorKind::NoAcknowledge(
                embedded_hal::i2c::NoAcknowledgeSource::Address,
            ));
        }
        let mut pointer: Option<u8> = None;
        for op in operations {
            match op {
                Operation::Write(bytes) => {
                    for &b in bytes.iter() {
                        match pointer {
                            None => pointer = Some(b),
                            Some(p) => {
                                self.regs[p as usize] = b;
                                pointer = Some(p.wrapping_add(1));
                            }
                        }
                    }
                }
                Operation::Read(buf) => {
                    let mut p = pointer.unwrap_or(0);
                    for b in buf.iter_mut() {
                        *b = self.regs[p as usize];
                        p = p.wrapping_add(1);
                    }
                    pointer = Some(p);
                }
            }
        }
        Ok(())
    }
}

#[test]
fn writes_land_at_base_plus_register() {
    let mut bus = I2cRegisterBus::new(FakeTarget::new(0x4A), 0x4A).with_base(0xD2);
    block_on(bus.write(0x01, 0x13)).unwrap();
    let target = bus.release();
    assert_eq!(target.regs[0xD3], 0x13);
    assert_eq!(target.transactions, 1);
}

#[test]
fn multi_byte_read_is_one_transaction() {
    let mut target = FakeTarget::new(0x4A);
    target.regs[0xDB..0xDE].copy_from_slice(&[0x01, 0xFF, 0x04]);
    let mut bus = I2cRegisterBus::new(target, 0x4A).with_base(0xD2);

    let mut buf = [0u8; 3];
    block_on(bus.read(0x09, &mut buf)).unwrap();
    assert_eq!(buf, [0x01, 0xFF, 0x04]);
    assert_eq!(block_on(bus.read_u8(0x0A)).unwrap(), 0xFF);
    assert_eq!(bus.release().transactions, 2);
}

#[test]
fn failures_carry_the_register() {
    let mut target = FakeTarget::new(0x4A);
    target.fail = true;
    let mut bus = I2cRegisterBus::new(target, 0x4A);

    assert_eq!(
        block_on(bus.write(0x17, 0x05)),
        Err(BusError::Write {
            register: 0x17,
            source: ErrorKind::Bus
        })
    );
    let mut buf = [0u8; 1];
    assert_eq!(
        block_on(bus.read(0x11, &mut buf)),
        Err(BusError::Read {
            register: 0x11,
            source: ErrorKind::Bus
        })
    );
}

#[test]
fn wrong_address_is_not_acknowledged() {
    let mut bus = I2cRegisterBus::new(FakeTarget::new(0x4A), 0x48);
    assert_eq!(bus.address(), 0x48);
    let err = block_on(bus.write(0x00, 0x00)).unwrap_err();
    assert_eq!(err.register(), 0x00);
    assert!(matches!(err.into_source(), ErrorKind::NoAcknowledge(_)));
}

#[test]
fn borrowed_bus_forwards_to_the_owner() {
    let mut bus = I2cRegisterBus::new(FakeTarget::new(0x4A), 0x4A);
    {
        let mut borrowed = &mut bus;
        block_on(RegisterBus::write(&mut borrowed, 0x05, 0x01)).unwrap();
        assert_eq!(block_on(RegisterBus::read_u8(&mut borrowed, 0x05)).unwrap(), 0x01);
    }
    assert_eq!(bus.release().transactions, 2);
}
