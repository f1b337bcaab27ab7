use crate::intern::ChannelName;


quick_error! {
    #[derive(Debug, Clone, PartialEq)]
    pub enum ChannelError {
        AlreadyExists(name: ChannelName) {
            display("channel {:?} already exists", name)
        }
        NotFound(name: ChannelName) {
            display("channel {:?} not found", name)
        }
        /// Channel was destroyed, it must be created again to be used
        Destroyed(name: ChannelName) {
            display("channel {:?} is destroyed", name)
        }
    }
}
