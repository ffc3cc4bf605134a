//! Ports module for the Membership subsystem

pub mod inbound;
pub mod outbound;

pub use inbound::{CommittedRecord, FlowRequest, MembershipApi};
pub use outbound::{
    Clock, FinalityGateway, IdentityProvider, MembershipRecordStore, NetworkConfigProvider,
    ProgressSink, SystemClock, TransactionSigner,
};
