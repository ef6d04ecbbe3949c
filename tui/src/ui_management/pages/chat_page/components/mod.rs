pub mod invitation_list;
pub mod invitee_picker;
pub mod message_input_box;
pub mod message_view;
pub mod room_list;
