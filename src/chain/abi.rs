use alloy::sol;

sol! {
    function name() external view returns (string name);
    function symbol() external view returns (string symbol);
    function balanceOf(address owner) external view returns (uint256 balance);
    function ownerOf(uint256 token_id) external view returns (address owner);
    function mint() external;
    function mintTo(address to) external;
    function burn(uint256 token_id) external;

    error InvalidTokenId(uint256 token_id);
    error NotOwner(address from, uint256 token_id, address real_owner);
    error NotApproved(address owner, address spender, uint256 token_id);
    error TransferToZero(uint256 token_id);
    error ReceiverRefused(address receiver, uint256 token_id, bytes4 returned);
}
