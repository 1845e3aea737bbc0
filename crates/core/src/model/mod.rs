mod account;
mod booking;
mod gift;
mod ids;
mod shop;
mod transaction;

pub use ids::{
    BookingId, GiftId, OrderId, ParseIdError, ProductId, ReaderId, ServiceId, SessionId,
    TransactionId, UserId,
};

pub use account::{Account, AccountError, Reader, ReadingKind, Role};
pub use booking::{Booking, BookingError, BookingPolicy, BookingStatus, TimeSlot};
pub use gift::{Gift, GiftCatalog};
pub use shop::{Cart, CartError, CartItem, FLAT_SHIPPING, Order, OrderStatus, Product};
pub use transaction::{Transaction, TransactionKind, TransactionStatus};
