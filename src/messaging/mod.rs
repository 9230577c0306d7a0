// Messaging - Wire messages and channels between the HUD and its observers

pub mod broadcast;
pub mod channels;
pub mod command;

pub use broadcast::Broadcast;
pub use channels::{
    BroadcastGateway, BroadcastReceiver, CommandReceiver, CommandSender, Subscription,
    create_command_channel,
};
pub use command::HudCommand;
