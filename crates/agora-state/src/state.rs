use super::*;

mod abci {
    use super::*;

    mod begin_block;
    mod check_tx;
    mod commit;
    mod deliver_tx;
    mod end_block;
    mod info;
    mod init_chain;
}

mod action {
    use super::*;

    mod create_comment;
    mod create_post;
    mod create_user;
    mod upvote;
}

mod admission;
mod chain_id;
mod checkpoint;
pub use checkpoint::encode_checkpoint;
mod documents;
mod height;
mod ledger;
pub use ledger::{Toggle, VoteLedger};
mod parameters;
pub use parameters::Parameters;
mod queries;
mod time;
mod validator;

/// The seven document collections making up the application state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Collection {
    Users,
    Posts,
    Comments,
    PostVotes,
    CommentVotes,
    Validators,
    ValidatorVotes,
}

impl Collection {
    pub const ALL: [Collection; 7] = [
        Collection::Users,
        Collection::Posts,
        Collection::Comments,
        Collection::PostVotes,
        Collection::CommentVotes,
        Collection::Validators,
        Collection::ValidatorVotes,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Posts => "posts",
            Collection::Comments => "comments",
            Collection::PostVotes => "userpostvotes",
            Collection::CommentVotes => "usercommentvotes",
            Collection::Validators => "validators",
            Collection::ValidatorVotes => "uservalidatorvotes",
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
